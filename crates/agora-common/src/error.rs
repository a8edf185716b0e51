//! Error types for Agora

use thiserror::Error;

use crate::domain::ContentStatus;

/// Moderation transition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModerationError {
    /// Only approved content can be featured
    #[error("content is {0}, only approved content can be featured")]
    NotApproved(ContentStatus),
}

/// Result type for moderation transitions
pub type ModerationResult<T> = Result<T, ModerationError>;
