//! Per-tag check-in status stored inside an attendee record.

use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One check-in or check-out attempt, successful or not. Never modified once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDetail {
    pub checked_in: bool,
    pub checked_in_date: DateTime<Utc>,
    pub checked_in_by: String,
    pub checkin_success: bool,
}

/// Current status and full audit trail of one attendee under one tag.
///
/// The top-level fields mirror the most recent entry of `details`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagState {
    pub checkin_success: bool,
    pub checked_in: bool,
    pub checked_in_date: Option<DateTime<Utc>>,
    pub checked_in_by: Option<String>,
    pub last_successful_checkin: Option<TagDetail>,
    #[serde(default)]
    pub details: Vec<TagDetail>,
}

impl TagState {
    pub fn last_detail(&self) -> Option<&TagDetail> {
        self.details.last()
    }
}

/// Tag name to state, stored as a JSON object keyed by lowercase tag name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct TagMap(pub BTreeMap<String, TagState>);

impl TagMap {
    pub fn get(&self, tag: &str) -> Option<&TagState> {
        self.0.get(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>, state: TagState) {
        self.0.insert(tag.into(), state);
    }

    pub fn remove(&mut self, tag: &str) -> Option<TagState> {
        self.0.remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagState)> {
        self.0.iter()
    }
}

/// Email addresses known for an attendee, stored as a JSON list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Emails(pub Vec<String>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_map_serializes_as_plain_object() {
        let mut tags = TagMap::default();
        tags.insert("hackgt", TagState::default());
        let value = serde_json::to_value(&tags).unwrap();
        assert_eq!(value["hackgt"]["checked_in"], json!(false));
        assert_eq!(value["hackgt"]["details"], json!([]));
        assert!(value["hackgt"]["last_successful_checkin"].is_null());
    }

    #[test]
    fn details_default_when_absent() {
        let state: TagState = serde_json::from_value(json!({
            "checkin_success": true,
            "checked_in": true,
            "checked_in_date": null,
            "checked_in_by": null,
            "last_successful_checkin": null
        }))
        .unwrap();
        assert!(state.details.is_empty());
    }
}
