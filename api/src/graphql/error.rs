use forward::ForwardError;
use sea_orm::DbErr;
use services::{checkin::CheckinError, tags::TagError};
use thiserror::Error;

/// Why one root field resolved to `null`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Argument \"{0}\" is required")]
    MissingArgument(&'static str),

    #[error("Argument \"{name}\" is invalid: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("User '{0}' was not found in the registration service")]
    UnknownUser(String),

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error(transparent)]
    Checkin(#[from] CheckinError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Database(#[from] DbErr),
}
