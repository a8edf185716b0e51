//! Agora Dynamic Forms
//!
//! Form definitions attached to events and opportunities to collect
//! registrant and applicant data.
//!
//! ## Features
//! - Section/field builder with positional option editing
//! - One conditional rule per field (show, hide, require, jump)
//! - Definition checks (duplicate ids, dangling rule references)
//! - Response validation against the evaluated form state
//! - JSON column codec and multipart submission payloads

use thiserror::Error;

pub mod builder;
pub mod check;
pub mod codec;
pub mod domain;
pub mod logic;
pub mod payload;
pub mod validate;

pub use builder::{FieldDraft, FieldPatch, FormBuilder};
pub use check::{check, ensure_valid, DefinitionIssue, Severity};
pub use domain::*;
pub use logic::{evaluate, FieldState, FormState, Responses};
pub use payload::{Payload, PayloadBuilder, PayloadError};
pub use validate::{validate, FieldError};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FormsError {
    #[error("Form closed")]
    FormClosed,

    #[error("Invalid form definition: {0}")]
    InvalidDefinition(String),

    #[error("Malformed form JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormsError>;
