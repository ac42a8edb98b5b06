//! Per-tag check-in state machine.
//!
//! [`apply_transition`] is the pure step; [`CheckinService::transition`] wraps it with tag
//! validation, the per-attendee lock and a version-checked save.

use chrono::{DateTime, Utc};
use db::models::attendee::{Model as Attendee, TagDetail, TagMap, TagState};
use db::models::tag::Model as Tag;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use thiserror::Error;
use tracing::{info, warn};
use util::keyed_lock::KeyedLocks;

use crate::tags::normalize_name;

#[derive(Debug, Error)]
pub enum CheckinError {
    #[error("Tag '{0}' does not exist")]
    UnknownTag(String),
    #[error("Attendee '{0}' was modified concurrently")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Result of one pure transition step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TagState,
    pub detail: TagDetail,
    /// Whether the attempt repeated the previous action, whatever the tag's duplicate policy.
    pub duplicate: bool,
}

/// Appends one check-in (`checkin = true`) or check-out attempt to `state`.
///
/// With no history only a check-in succeeds. Afterwards an attempt succeeds when it
/// differs from the last recorded action, unless `warn_on_duplicates` is off, in which
/// case every attempt succeeds.
pub fn apply_transition(
    state: &TagState,
    checkin: bool,
    actor: &str,
    now: DateTime<Utc>,
    warn_on_duplicates: bool,
) -> Transition {
    let detected = match state.last_detail() {
        None => checkin,
        Some(last) => last.checked_in != checkin,
    };
    let success = detected || !warn_on_duplicates;

    let detail = TagDetail {
        checked_in: checkin,
        checked_in_date: now,
        checked_in_by: actor.to_string(),
        checkin_success: success,
    };

    let mut details = state.details.clone();
    details.push(detail.clone());

    let last_successful_checkin = details
        .iter()
        .rev()
        .find(|d| d.checked_in == checkin && d.checkin_success)
        .cloned();

    Transition {
        state: TagState {
            checkin_success: detail.checkin_success,
            checked_in: detail.checked_in,
            checked_in_date: Some(detail.checked_in_date),
            checked_in_by: Some(detail.checked_in_by.clone()),
            last_successful_checkin,
            details,
        },
        duplicate: !detected,
        detail,
    }
}

/// Identity fields copied from the registration service when an attendee is first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub emails: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub attendee_id: String,
    pub tag: String,
    pub checkin: bool,
    pub actor: String,
    pub identity: Identity,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub attendee: Attendee,
    pub tag: String,
    pub state: TagState,
    pub detail: TagDetail,
    pub duplicate: bool,
}

pub struct CheckinService;

impl CheckinService {
    /// Fails with [`CheckinError::UnknownTag`] unless the tag exists.
    pub async fn require_tag(db: &DatabaseConnection, tag: &str) -> Result<Tag, CheckinError> {
        let name = normalize_name(tag);
        Tag::find_by_name(db, &name)
            .await?
            .ok_or(CheckinError::UnknownTag(name))
    }

    /// Records one check-in or check-out and persists the attendee.
    ///
    /// Transitions for one attendee run one at a time in this process. A write from
    /// another process between load and save yields [`CheckinError::Conflict`] and
    /// leaves the stored record untouched.
    pub async fn transition(
        db: &DatabaseConnection,
        locks: &KeyedLocks,
        request: TransitionRequest,
    ) -> Result<TransitionOutcome, CheckinError> {
        let tag = Self::require_tag(db, &request.tag).await?;
        let _guard = locks.acquire(&request.attendee_id).await;

        let existing = Attendee::find_by_id(db, &request.attendee_id).await?;
        let current = existing
            .as_ref()
            .and_then(|a| a.tags.get(&tag.name).cloned())
            .unwrap_or_default();

        let step = apply_transition(
            &current,
            request.checkin,
            &request.actor,
            Utc::now(),
            tag.warn_on_duplicates,
        );

        let attendee = match existing {
            Some(mut attendee) => {
                attendee.tags.insert(tag.name.clone(), step.state.clone());
                attendee
                    .save_if_unchanged(db)
                    .await?
                    .ok_or_else(|| CheckinError::Conflict(request.attendee_id.clone()))
                    .inspect_err(|_| {
                        warn!(attendee = %request.attendee_id, tag = %tag.name, "Stale attendee version")
                    })?
            }
            None => {
                let mut tags = TagMap::default();
                tags.insert(tag.name.clone(), step.state.clone());
                let created = Attendee::create(
                    db,
                    &request.attendee_id,
                    &request.identity.name,
                    request.identity.emails.clone(),
                    tags,
                )
                .await;
                match created {
                    Ok(attendee) => attendee,
                    Err(e) => return Err(Self::first_sight_error(db, &request.attendee_id, e).await),
                }
            }
        };

        info!(
            attendee = %attendee.id,
            tag = %tag.name,
            action = if request.checkin { "check_in" } else { "check_out" },
            actor = %request.actor,
            success = step.detail.checkin_success,
            duplicate = step.duplicate,
            "Tag transition recorded"
        );

        Ok(TransitionOutcome {
            attendee,
            tag: tag.name,
            state: step.state,
            detail: step.detail,
            duplicate: step.duplicate,
        })
    }

    /// An insert that lost the race against another writer's first sight of the same
    /// attendee is a conflict, not a storage failure.
    async fn first_sight_error(db: &DatabaseConnection, attendee_id: &str, err: DbErr) -> CheckinError {
        let duplicate = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
            || matches!(Attendee::find_by_id(db, attendee_id).await, Ok(Some(_)));
        if duplicate {
            warn!(attendee = %attendee_id, error = %err, "Attendee created concurrently");
            CheckinError::Conflict(attendee_id.to_string())
        } else {
            CheckinError::Database(err)
        }
    }
}
