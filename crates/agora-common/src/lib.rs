//! Agora Common - Shared domain for the community platform
//!
//! This crate provides the pieces every content type shares:
//! - Content kinds and moderation status
//! - Moderation metadata and its transitions
//! - Moderation events
//! - Repository abstraction with an in-memory implementation
//! - Error handling
//!
//! # Architecture
//!
//! - **Value Objects**: `ContentKind`, `ContentStatus`
//! - **Aggregates**: `ContentMeta` carried by every event, opportunity and project
//! - **Domain Events**: `ModerationEvent` (approved, rejected, featured)
//! - **Repositories**: whole-record persistence, last write wins

#![warn(clippy::all)]

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::*;
