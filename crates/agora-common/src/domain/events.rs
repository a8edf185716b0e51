//! Domain Events - Record significant occurrences in the domain
//!
//! Events are:
//! - Immutable records of past occurrences
//! - Named in past tense

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::ContentKind;

/// Base event metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Unique event ID
    pub event_id: Uuid,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of the moderated content
    pub kind: ContentKind,
    /// ID of the moderated content
    pub content_id: Uuid,
    /// Moderator who acted
    pub moderator_id: Uuid,
}

impl EventMetadata {
    pub fn new(kind: ContentKind, content_id: Uuid, moderator_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            content_id,
            moderator_id,
        }
    }
}

/// Moderation decision on a content record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModerationEvent {
    /// Content was approved
    ContentApproved { metadata: EventMetadata },
    /// Content was rejected
    ContentRejected {
        metadata: EventMetadata,
        reason: Option<String>,
    },
    /// Featured flag changed
    ContentFeatured { metadata: EventMetadata, featured: bool },
}

impl ModerationEvent {
    pub fn approved(kind: ContentKind, id: Uuid, moderator: Uuid) -> Self {
        Self::ContentApproved {
            metadata: EventMetadata::new(kind, id, moderator),
        }
    }

    pub fn rejected(kind: ContentKind, id: Uuid, moderator: Uuid, reason: Option<String>) -> Self {
        Self::ContentRejected {
            metadata: EventMetadata::new(kind, id, moderator),
            reason,
        }
    }

    pub fn featured(kind: ContentKind, id: Uuid, moderator: Uuid, featured: bool) -> Self {
        Self::ContentFeatured {
            metadata: EventMetadata::new(kind, id, moderator),
            featured,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ContentApproved { .. } => "content.approved",
            Self::ContentRejected { .. } => "content.rejected",
            Self::ContentFeatured { .. } => "content.featured",
        }
    }

    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::ContentApproved { metadata }
            | Self::ContentRejected { metadata, .. }
            | Self::ContentFeatured { metadata, .. } => metadata,
        }
    }

    /// Emit the event to the tracing pipeline
    pub fn log(&self) {
        let meta = self.metadata();
        tracing::info!(
            event = self.event_type(),
            kind = %meta.kind,
            content_id = %meta.content_id,
            moderator_id = %meta.moderator_id,
            "moderation decision"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = ModerationEvent::featured(ContentKind::Event, Uuid::new_v4(), Uuid::new_v4(), true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "contentFeatured");
        assert_eq!(json["featured"], true);
        assert_eq!(json["metadata"]["kind"], "event");
    }
}
