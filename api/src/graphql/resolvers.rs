//! One resolver per root field. Each returns a [`Node`] that the executor then projects
//! through the client's selection.

use chrono::{DateTime, Utc};
use db::models::{attendee::Model as Attendee, tag::Model as Tag};
use forward::document::{Document, Field, OperationDefinition};
use forward::{ForwardRequest, ForwardSpec, included_field};
use serde_json::{Map, Value};
use services::checkin::{CheckinService, Identity, TransitionRequest};
use services::tags::{NewTag, TagService};
use util::state::AppState;

use super::error::ResolveError;
use super::node::{self, Node};
use super::schema::{RootField, Schema};
use crate::auth::Staff;
use crate::ws::tag_change::{
    emit::tag_changed,
    payload::{TagChange, TagStateView},
};

/// Everything a resolver may look at for one request.
pub struct Resolver<'a> {
    pub state: &'a AppState,
    pub schema: &'a Schema,
    pub staff: &'a Staff,
    pub source: &'a str,
    pub document: &'a Document,
    pub operation: &'a OperationDefinition,
    pub variables: &'a Map<String, Value>,
}

impl Resolver<'_> {
    /// `fields` all share one response key; the first one carries the arguments.
    pub async fn resolve(&self, root: RootField, fields: &[&Field]) -> Result<Node, ResolveError> {
        match root {
            RootField::Typename => Ok(Node::Scalar(self.operation.kind.root_type().into())),
            RootField::Tags => {
                let tags = TagService::list(self.state.db()).await?;
                Ok(Node::List(tags.iter().map(node::tag).collect()))
            }
            RootField::User => self.users(&self.schema.user, fields).await,
            RootField::Users => self.users(&self.schema.users, fields).await,
            RootField::SearchUserSimple => self.users(&self.schema.search_user_simple, fields).await,
            RootField::QuestionBranches => self.pass_through(&self.schema.question_branches, fields).await,
            RootField::QuestionNames => self.pass_through(&self.schema.question_names, fields).await,
            RootField::CheckIn => self.check(&self.schema.check_in, fields, true).await,
            RootField::CheckOut => self.check(&self.schema.check_out, fields, false).await,
            RootField::AddTag => self.add_tag(fields).await,
            RootField::RemoveTag => self.remove_tag(fields).await,
        }
    }

    async fn forward(&self, spec: &ForwardSpec, fields: &[&Field]) -> Result<Option<Value>, ResolveError> {
        let request = ForwardRequest {
            source: self.source,
            document: self.document,
            operation: self.operation,
            field_nodes: fields,
            variables: self.variables,
        };
        Ok(self.state.forwarder().forward(spec, &request).await?)
    }

    fn arguments(&self, fields: &[&Field]) -> Map<String, Value> {
        fields
            .first()
            .map(|field| field.argument_values(self.variables))
            .unwrap_or_default()
    }

    async fn pass_through(&self, spec: &ForwardSpec, fields: &[&Field]) -> Result<Node, ResolveError> {
        Ok(self.forward(spec, fields).await?.map(Node::Forwarded).unwrap_or(Node::Null))
    }

    /// `user`, `users` and `search_user_simple`: forwarded users with local tag states.
    async fn users(&self, spec: &ForwardSpec, fields: &[&Field]) -> Result<Node, ResolveError> {
        let Some(value) = self.forward(spec, fields).await? else {
            return Ok(Node::Null);
        };
        let records = Tag::list(self.state.db()).await?;
        match value {
            Value::Array(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    nodes.push(self.user_and_tags(item, &records).await?);
                }
                Ok(Node::List(nodes))
            }
            other => self.user_and_tags(other, &records).await,
        }
    }

    async fn user_and_tags(&self, wrapped: Value, records: &[Tag]) -> Result<Node, ResolveError> {
        let user = match wrapped {
            Value::Object(mut map) => map.remove("user").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        if user.is_null() {
            return Ok(Node::Null);
        }
        let attendee = match user_id(&user) {
            Some(id) => Attendee::find_by_id(self.state.db(), &id).await?,
            None => None,
        };
        let tags = attendee
            .as_ref()
            .map(|a| TagStateView::all(a.tag_states(), records))
            .unwrap_or_default();
        Ok(node::user_and_tags(user, &tags))
    }

    /// `check_in` / `check_out`: validate the tag, fetch the identity upstream, apply the
    /// transition and publish it.
    async fn check(&self, spec: &ForwardSpec, fields: &[&Field], checkin: bool) -> Result<Node, ResolveError> {
        let args = self.arguments(fields);
        let requested = string_arg(&args, "user")?;
        let tag = string_arg(&args, "tag")?;

        // Nothing is forwarded or written for a tag that does not exist.
        CheckinService::require_tag(self.state.db(), &tag).await?;

        let head = format!("user(id: {})", Value::String(requested.clone()));
        let user = self
            .forward(&spec.with_head(head), fields)
            .await?
            .and_then(|mut value| value.get_mut("user").map(Value::take))
            .filter(|user| !user.is_null())
            .ok_or_else(|| ResolveError::UnknownUser(requested.clone()))?;

        let outcome = CheckinService::transition(
            self.state.db(),
            self.state.locks(),
            TransitionRequest {
                // The id asked for, not whatever the client's selection put under `id`.
                attendee_id: requested,
                tag,
                checkin,
                actor: self.staff.0.clone(),
                identity: identity(&user),
            },
        )
        .await?;

        let records = Tag::list(self.state.db()).await?;
        let tags = TagStateView::all(outcome.attendee.tag_states(), &records);
        tag_changed(
            self.state.ws(),
            TagChange {
                user: user.clone(),
                tags: tags.clone(),
                tag: outcome.tag,
            },
        )
        .await;

        Ok(node::user_and_tags(user, &tags))
    }

    async fn add_tag(&self, fields: &[&Field]) -> Result<Node, ResolveError> {
        let args = self.arguments(fields);
        let input = NewTag {
            name: string_arg(&args, "name")?,
            start: time_arg(&args, "start")?,
            end: time_arg(&args, "end")?,
            warn_on_duplicates: args.get("warnOnDuplicates").and_then(Value::as_bool),
        };
        let tag = TagService::add(self.state.db(), input).await?;
        Ok(node::tag(&tag))
    }

    async fn remove_tag(&self, fields: &[&Field]) -> Result<Node, ResolveError> {
        let name = string_arg(&self.arguments(fields), "name")?;
        TagService::remove(self.state.db(), &name).await?;
        Ok(Node::Scalar(Value::Bool(true)))
    }
}

fn string_arg(args: &Map<String, Value>, name: &'static str) -> Result<String, ResolveError> {
    match args.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | None => Err(ResolveError::MissingArgument(name)),
        Some(_) => Err(ResolveError::InvalidArgument {
            name,
            reason: "expected a string".to_string(),
        }),
    }
}

fn time_arg(args: &Map<String, Value>, name: &'static str) -> Result<Option<DateTime<Utc>>, ResolveError> {
    match args.get(name) {
        Some(Value::Null) | None => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|at| Some(at.with_timezone(&Utc)))
            .map_err(|e| ResolveError::InvalidArgument {
                name,
                reason: e.to_string(),
            }),
        Some(_) => Err(ResolveError::InvalidArgument {
            name,
            reason: "expected an RFC 3339 timestamp".to_string(),
        }),
    }
}

/// Upstream ids may come back as strings or numbers.
fn user_id(user: &Value) -> Option<String> {
    match included_field(user, "id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Name and addresses copied onto a newly seen attendee.
fn identity(user: &Value) -> Identity {
    let mut emails = Vec::new();
    for key in ["email", "emails"] {
        match included_field(user, key) {
            Some(Value::String(email)) => emails.push(email.clone()),
            Some(Value::Array(list)) => {
                emails.extend(list.iter().filter_map(Value::as_str).map(str::to_string))
            }
            _ => {}
        }
    }
    Identity {
        name: included_field(user, "name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        emails,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_accepts_single_or_many_emails() {
        let one = identity(&json!({ "id": "1", "name": "Ada", "email": "ada@example.com" }));
        assert_eq!(one.name, "Ada");
        assert_eq!(one.emails, vec!["ada@example.com"]);

        let many = identity(&json!({ "emails": ["a@x.io", 3, "b@x.io"] }));
        assert_eq!(many.name, "");
        assert_eq!(many.emails, vec!["a@x.io", "b@x.io"]);
    }

    #[test]
    fn ids_may_be_numeric() {
        assert_eq!(user_id(&json!({ "id": 42 })), Some("42".to_string()));
        assert_eq!(user_id(&json!({ "id": "u1" })), Some("u1".to_string()));
        assert_eq!(user_id(&json!({ "name": "x" })), None);
    }

    #[test]
    fn identity_ignores_client_aliases_over_included_fields() {
        let user = json!({
            "name": "ada@example.com",
            "_include_name": "Ada",
            "id": "Ada",
            "_include_id": "u1",
        });
        assert_eq!(user_id(&user), Some("u1".to_string()));
        assert_eq!(identity(&user).name, "Ada");
    }

    #[test]
    fn time_arguments_are_rfc3339() {
        let args = json!({ "start": "2026-10-17T09:00:00Z", "end": "tomorrow", "none": null });
        let args = args.as_object().unwrap();
        assert!(time_arg(args, "start").unwrap().is_some());
        assert!(time_arg(args, "none").unwrap().is_none());
        assert!(matches!(
            time_arg(args, "end"),
            Err(ResolveError::InvalidArgument { name: "end", .. })
        ));
        assert!(matches!(
            string_arg(args, "missing"),
            Err(ResolveError::MissingArgument("missing"))
        ));
    }
}
