use chrono::{DateTime, Utc};
use db::models::attendee::TagState;
use db::models::tag::Model as Tag;
use serde::Serialize;
use serde_json::Value;

/// The tag a [`TagStateView`] belongs to. Window and policy are absent when the tag
/// record no longer exists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagRef {
    pub name: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(rename = "warnOnDuplicates")]
    pub warn_on_duplicates: Option<bool>,
}

impl TagRef {
    pub fn new(name: &str, record: Option<&Tag>) -> Self {
        Self {
            name: name.to_string(),
            start: record.and_then(|t| t.start),
            end: record.and_then(|t| t.end),
            warn_on_duplicates: record.map(|t| t.warn_on_duplicates),
        }
    }
}

/// One attendee's state under one tag, as shown to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagStateView {
    pub tag: TagRef,
    #[serde(flatten)]
    pub state: TagState,
}

impl TagStateView {
    /// Views for every tag of an attendee, in tag-name order.
    pub fn all<'a>(
        states: impl Iterator<Item = (&'a String, &'a TagState)>,
        records: &[Tag],
    ) -> Vec<Self> {
        states
            .map(|(name, state)| Self {
                tag: TagRef::new(name, records.iter().find(|t| &t.name == name)),
                state: state.clone(),
            })
            .collect()
    }
}

/// Body of a `tag_change` event: same shape as a check-in mutation result, plus the
/// tag that changed.
#[derive(Debug, Clone, Serialize)]
pub struct TagChange {
    /// Identity as returned by the registration service.
    pub user: Value,
    pub tags: Vec<TagStateView>,
    pub tag: String,
}
