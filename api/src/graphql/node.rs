//! Resolved values before they are cut down to the client's selection.
//!
//! Local objects are keyed by field name and carry their type name, so fragments with
//! type conditions and `__typename` can be answered. Forwarded subtrees are kept as the
//! registration service returned them, keyed by response key.

use chrono::{DateTime, Utc};
use db::models::attendee::TagDetail;
use db::models::tag::Model as Tag;
use serde_json::Value;

use crate::ws::tag_change::payload::{TagRef, TagStateView};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Scalar(Value),
    List(Vec<Node>),
    Object(Object),
    Forwarded(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub typename: &'static str,
    fields: Vec<(&'static str, Node)>,
}

impl Object {
    pub fn new(typename: &'static str) -> Self {
        Self {
            typename,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, node: Node) -> Self {
        self.fields.push((name, node));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, node)| node)
    }
}

impl From<Object> for Node {
    fn from(object: Object) -> Self {
        Node::Object(object)
    }
}

fn scalar(value: impl Into<Value>) -> Node {
    Node::Scalar(value.into())
}

fn time(at: Option<DateTime<Utc>>) -> Node {
    match at {
        Some(at) => scalar(at.to_rfc3339()),
        None => Node::Null,
    }
}

fn optional<T: Into<Value>>(value: Option<T>) -> Node {
    value.map(scalar).unwrap_or(Node::Null)
}

pub fn tag(record: &Tag) -> Node {
    Object::new("Tag")
        .field("name", scalar(record.name.clone()))
        .field("start", time(record.start))
        .field("end", time(record.end))
        .field("warnOnDuplicates", scalar(record.warn_on_duplicates))
        .into()
}

fn tag_ref(tag: &TagRef) -> Node {
    Object::new("Tag")
        .field("name", scalar(tag.name.clone()))
        .field("start", time(tag.start))
        .field("end", time(tag.end))
        .field("warnOnDuplicates", optional(tag.warn_on_duplicates))
        .into()
}

pub fn tag_detail(detail: &TagDetail) -> Node {
    Object::new("TagDetail")
        .field("checked_in", scalar(detail.checked_in))
        .field("checked_in_date", time(Some(detail.checked_in_date)))
        .field("checked_in_by", scalar(detail.checked_in_by.clone()))
        .field("checkin_success", scalar(detail.checkin_success))
        .into()
}

pub fn tag_state(view: &TagStateView) -> Node {
    let state = &view.state;
    Object::new("TagState")
        .field("tag", tag_ref(&view.tag))
        .field("checked_in", scalar(state.checked_in))
        .field("checkin_success", scalar(state.checkin_success))
        .field("checked_in_date", time(state.checked_in_date))
        .field("checked_in_by", optional(state.checked_in_by.clone()))
        .field(
            "last_successful_checkin",
            state
                .last_successful_checkin
                .as_ref()
                .map(tag_detail)
                .unwrap_or(Node::Null),
        )
        .field(
            "details",
            Node::List(state.details.iter().map(tag_detail).collect()),
        )
        .into()
}

/// `UserAndTags`: the registration service's user plus this service's tag states.
pub fn user_and_tags(user: Value, tags: &[TagStateView]) -> Node {
    Object::new("UserAndTags")
        .field("user", Node::Forwarded(user))
        .field("tags", Node::List(tags.iter().map(tag_state).collect()))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::attendee::TagState;
    use serde_json::json;

    #[test]
    fn tag_state_without_record_has_null_policy() {
        let view = TagStateView {
            tag: TagRef::new("hackgt", None),
            state: TagState::default(),
        };
        let Node::Object(object) = tag_state(&view) else {
            panic!("expected object");
        };
        assert_eq!(object.typename, "TagState");
        let Some(Node::Object(tag)) = object.get("tag") else {
            panic!("expected tag object");
        };
        assert_eq!(tag.get("name"), Some(&Node::Scalar(json!("hackgt"))));
        assert_eq!(tag.get("warnOnDuplicates"), Some(&Node::Null));
        assert_eq!(object.get("details"), Some(&Node::List(vec![])));
        assert_eq!(object.get("missing"), None);
    }
}
