//! The fields this endpoint serves and how the forwarded ones reach the registration
//! service.

use forward::ForwardSpec;
use forward::document::OperationKind;

/// Forwarding configuration for every delegated field, built once at startup.
#[derive(Debug, Clone)]
pub struct Schema {
    pub user: ForwardSpec,
    pub users: ForwardSpec,
    pub search_user_simple: ForwardSpec,
    pub question_branches: ForwardSpec,
    pub question_names: ForwardSpec,
    /// Heads are filled in per call from the `user` argument.
    pub check_in: ForwardSpec,
    pub check_out: ForwardSpec,
}

impl Schema {
    pub fn new() -> Self {
        Self {
            user: ForwardSpec::new(Some("user.user"), &["id"]),
            users: ForwardSpec::new(Some("users.user"), &["id"]),
            search_user_simple: ForwardSpec::new(Some("search_user_simple.user"), &["id"]),
            question_branches: ForwardSpec::default(),
            question_names: ForwardSpec::default(),
            check_in: ForwardSpec::new(Some("check_in.user"), &["id", "name", "email"]),
            check_out: ForwardSpec::new(Some("check_out.user"), &["id", "name", "email"]),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootField {
    Typename,
    // Query
    Tags,
    User,
    Users,
    SearchUserSimple,
    QuestionBranches,
    QuestionNames,
    // Mutation
    CheckIn,
    CheckOut,
    AddTag,
    RemoveTag,
}

impl RootField {
    pub fn lookup(kind: OperationKind, name: &str) -> Option<Self> {
        if name == "__typename" {
            return Some(RootField::Typename);
        }
        match kind {
            OperationKind::Query => match name {
                "tags" => Some(RootField::Tags),
                "user" => Some(RootField::User),
                "users" => Some(RootField::Users),
                "search_user_simple" => Some(RootField::SearchUserSimple),
                "question_branches" => Some(RootField::QuestionBranches),
                "question_names" => Some(RootField::QuestionNames),
                _ => None,
            },
            OperationKind::Mutation => match name {
                "check_in" => Some(RootField::CheckIn),
                "check_out" => Some(RootField::CheckOut),
                "add_tag" => Some(RootField::AddTag),
                "remove_tag" => Some(RootField::RemoveTag),
                _ => None,
            },
            OperationKind::Subscription => None,
        }
    }
}
