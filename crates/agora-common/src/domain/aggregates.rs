//! Aggregates - Consistency boundaries for domain entities
//!
//! Every piece of user-submitted content (event, opportunity, project)
//! embeds a [`ContentMeta`]; moderation transitions go through it so the
//! status/featured invariants hold no matter which kind is being moderated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::ModerationEvent;
use super::repositories::Entity;
use super::value_objects::*;
use crate::error::{ModerationError, ModerationResult};

/// A moderated content record (event, opportunity, project)
pub trait Content: Entity {
    /// Kind reported in review queues and moderation events
    const KIND: ContentKind;

    /// Display title
    fn title(&self) -> &str;

    /// Moderation metadata
    fn meta(&self) -> &ContentMeta;

    /// Mutable moderation metadata
    fn meta_mut(&mut self) -> &mut ContentMeta;
}

/// Authorship and moderation state of a content record
///
/// # Invariants
/// - `featured` implies `status == Approved`
/// - `rejection_reason` is only set while `Rejected`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMeta {
    pub author_id: Uuid,
    pub status: ContentStatus,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentMeta {
    /// Fresh metadata for content submitted by `author_id`
    pub fn new(author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            author_id,
            status: ContentStatus::Pending,
            featured: false,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the content is publicly visible
    pub fn is_public(&self) -> bool {
        self.status == ContentStatus::Approved
    }

    /// Approve the content
    pub fn approve(&mut self, kind: ContentKind, id: Uuid, moderator: Uuid) -> ModerationEvent {
        self.status = ContentStatus::Approved;
        self.rejection_reason = None;
        self.touch();
        ModerationEvent::approved(kind, id, moderator)
    }

    /// Reject the content; a rejected item loses its featured flag
    pub fn reject(&mut self, kind: ContentKind, id: Uuid, moderator: Uuid, reason: Option<String>) -> ModerationEvent {
        self.status = ContentStatus::Rejected;
        self.featured = false;
        self.rejection_reason = reason.clone().filter(|r| !r.trim().is_empty());
        self.touch();
        ModerationEvent::rejected(kind, id, moderator, reason)
    }

    /// Feature or unfeature. Featuring requires approval.
    pub fn set_featured(
        &mut self,
        kind: ContentKind,
        id: Uuid,
        moderator: Uuid,
        featured: bool,
    ) -> ModerationResult<ModerationEvent> {
        if featured && self.status != ContentStatus::Approved {
            return Err(ModerationError::NotApproved(self.status));
        }
        self.featured = featured;
        self.touch();
        Ok(ModerationEvent::featured(kind, id, moderator, featured))
    }

    /// Send content back to the review queue after an author edit
    pub fn resubmit(&mut self) {
        self.status = ContentStatus::Pending;
        self.featured = false;
        self.rejection_reason = None;
        self.touch();
    }

    /// Bump `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
