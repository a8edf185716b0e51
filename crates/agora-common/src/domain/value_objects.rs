//! Value Objects - Immutable domain primitives
//!
//! Value Objects are:
//! - Immutable
//! - Comparable by value (not identity)
//! - Side-effect free

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of user-submitted content that goes through moderation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Event,
    Opportunity,
    Project,
}

impl ContentKind {
    /// Every kind, in review-queue order
    pub const ALL: [ContentKind; 3] = [ContentKind::Event, ContentKind::Opportunity, ContentKind::Project];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Opportunity => "opportunity",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" | "events" => Ok(Self::Event),
            "opportunity" | "opportunities" => Ok(Self::Opportunity),
            "project" | "projects" => Ok(Self::Project),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Moderation status
///
/// # Invariants
/// - New content starts `Pending`
/// - Only `Approved` content is publicly listed or featured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ContentStatus {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Parse failure for the enums above
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("Events".parse::<ContentKind>().unwrap(), ContentKind::Event);
        assert_eq!("opportunity".parse::<ContentKind>().unwrap(), ContentKind::Opportunity);
        assert!("forum".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_status_default_pending() {
        assert_eq!(ContentStatus::default(), ContentStatus::Pending);
        assert_eq!("APPROVED".parse::<ContentStatus>().unwrap(), ContentStatus::Approved);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&ContentKind::Project).unwrap(), "\"project\"");
        assert_eq!(serde_json::to_string(&ContentStatus::Rejected).unwrap(), "\"rejected\"");
    }
}
