//! Tag master records: listing, creation with window validation, and bulk removal.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use common::format_validation_errors;
use db::models::attendee::{Model as Attendee, TagRemoval};
use db::models::tag::Model as Tag;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

#[derive(Debug, Error)]
pub enum TagError {
    #[error("{0}")]
    Validation(String),
    #[error("Tag '{0}' already exists")]
    Exists(String),
    #[error("Tag '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Input for [`TagService::add`].
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct NewTag {
    #[validate(length(min = 1, max = 64, message = "Tag name cannot be empty or longer than 64 characters"))]
    pub name: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub warn_on_duplicates: Option<bool>,
}

impl NewTag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: None,
            end: None,
            warn_on_duplicates: None,
        }
    }
}

fn validate_window(tag: &NewTag) -> Result<(), ValidationError> {
    match (tag.start, tag.end) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(ValidationError::new("window")
            .with_message(Cow::Borrowed("Tag start must be before its end"))),
        _ => Err(ValidationError::new("window")
            .with_message(Cow::Borrowed("Tag start and end must be given together"))),
    }
}

/// Tag names are case-insensitive and stored lowercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct TagService;

impl TagService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<Tag>, TagError> {
        Ok(Tag::list(db).await?)
    }

    pub async fn find(db: &DatabaseConnection, name: &str) -> Result<Option<Tag>, TagError> {
        Ok(Tag::find_by_name(db, &normalize_name(name)).await?)
    }

    /// Creates a tag. `warn_on_duplicates` defaults to `true`.
    pub async fn add(db: &DatabaseConnection, input: NewTag) -> Result<Tag, TagError> {
        let input = NewTag {
            name: normalize_name(&input.name),
            ..input
        };
        input
            .validate()
            .map_err(|e| TagError::Validation(format_validation_errors(&e)))?;

        if Tag::find_by_name(db, &input.name).await?.is_some() {
            return Err(TagError::Exists(input.name));
        }

        let tag = Tag::create(
            db,
            &input.name,
            input.start,
            input.end,
            input.warn_on_duplicates.unwrap_or(true),
        )
        .await?;
        info!(tag = %tag.name, warn_on_duplicates = tag.warn_on_duplicates, "Tag created");
        Ok(tag)
    }

    /// Deletes the tag and drops it from every attendee in one transaction.
    pub async fn remove(db: &DatabaseConnection, name: &str) -> Result<TagRemoval, TagError> {
        let name = normalize_name(name);
        let txn = db.begin().await?;

        if !Tag::delete_by_name(&txn, &name).await? {
            txn.rollback().await?;
            return Err(TagError::NotFound(name));
        }
        let removal = Attendee::drop_tag_everywhere(&txn, &name).await?;
        txn.commit().await?;

        info!(
            tag = %name,
            updated = removal.updated,
            deleted = removal.deleted,
            "Tag removed"
        );
        Ok(removal)
    }
}
