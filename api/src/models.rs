//! API Models

use agora_common::{Content, ContentKind, ContentMeta, ContentStatus, Entity};
use agora_forms::codec::{from_column, from_optional_column};
use agora_forms::{DefinitionIssue, FormDefinition, FormsError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
            }),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    /// Per-field errors or definition issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

/// Accept an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Public listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Only featured (or only unfeatured) items
    pub featured: Option<bool>,
}

impl ListQuery {
    /// Approved content matching the filter
    pub fn admits(&self, meta: &ContentMeta) -> bool {
        meta.is_public() && self.featured.map_or(true, |f| meta.featured == f)
    }
}

// ============ Moderation ============

/// Moderation state as exposed to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Moderation {
    pub author_id: Uuid,
    #[schema(value_type = String, example = "pending")]
    pub status: ContentStatus,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ContentMeta> for Moderation {
    fn from(meta: &ContentMeta) -> Self {
        Self {
            author_id: meta.author_id,
            status: meta.status,
            featured: meta.featured,
            rejection_reason: meta.rejection_reason.clone(),
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Approve or reject a content record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[schema(value_type = String, example = "event")]
    pub kind: ContentKind,
    pub id: Uuid,
    pub approved: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Feature or unfeature an approved content record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    #[schema(value_type = String, example = "event")]
    pub kind: ContentKind,
    pub id: Uuid,
    pub featured: bool,
}

/// Review queue filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    /// `pending` (default), `approved` or `rejected`
    #[param(value_type = Option<String>)]
    pub status: Option<ContentStatus>,
    /// Restrict to one kind
    #[param(value_type = Option<String>)]
    pub kind: Option<ContentKind>,
}

/// One entry of the review queue, or the result of a moderation call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    #[schema(value_type = String, example = "opportunity")]
    pub kind: ContentKind,
    pub id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl ReviewItem {
    pub fn of<T: Content>(item: &T) -> Self {
        Self {
            kind: T::KIND,
            id: item.id(),
            title: item.title().to_string(),
            moderation: item.meta().into(),
        }
    }
}

// ============ Forms ============

/// A form definition stored on its own, referenced by `formId`
#[derive(Debug, Clone)]
pub struct StoredForm {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// JSON column
    pub definition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for StoredForm {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Stored form with its definition decoded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(value_type = Object)]
    pub definition: FormDefinition,
    /// Warning-level issues found when the form was saved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Object>)]
    pub warnings: Vec<DefinitionIssue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&StoredForm> for FormView {
    type Error = FormsError;

    fn try_from(form: &StoredForm) -> Result<Self, Self::Error> {
        Ok(Self {
            id: form.id,
            owner_id: form.owner_id,
            definition: from_column(&form.definition)?,
            warnings: Vec::new(),
            created_at: form.created_at,
            updated_at: form.updated_at,
        })
    }
}

// ============ Events ============

/// Event
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub form_id: Option<Uuid>,
    /// JSON column
    pub registration_form: Option<String>,
    pub meta: ContentMeta,
}

impl Entity for Event {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }
}

impl Content for Event {
    const KIND: ContentKind = ContentKind::Event;

    fn title(&self) -> &str {
        &self.title
    }

    fn meta(&self) -> &ContentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ContentMeta {
        &mut self.meta
    }
}

/// Event as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub form_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub registration_form: Option<FormDefinition>,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl TryFrom<&Event> for EventView {
    type Error = FormsError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        Ok(Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            category: event.category.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            location: event.location.clone(),
            tags: event.tags.clone(),
            form_id: event.form_id,
            registration_form: from_optional_column(event.registration_form.as_deref())?,
            moderation: (&event.meta).into(),
        })
    }
}

// ============ Opportunities ============

/// Opportunity
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub organization: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub requirements: Vec<String>,
    pub form_id: Option<Uuid>,
    /// JSON column
    pub application_form: Option<String>,
    pub meta: ContentMeta,
}

impl Entity for Opportunity {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }
}

impl Content for Opportunity {
    const KIND: ContentKind = ContentKind::Opportunity;

    fn title(&self) -> &str {
        &self.title
    }

    fn meta(&self) -> &ContentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ContentMeta {
        &mut self.meta
    }
}

/// Opportunity as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub organization: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub requirements: Vec<String>,
    pub form_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub application_form: Option<FormDefinition>,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl TryFrom<&Opportunity> for OpportunityView {
    type Error = FormsError;

    fn try_from(opp: &Opportunity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: opp.id,
            title: opp.title.clone(),
            description: opp.description.clone(),
            category: opp.category.clone(),
            organization: opp.organization.clone(),
            deadline: opp.deadline,
            location: opp.location.clone(),
            tags: opp.tags.clone(),
            requirements: opp.requirements.clone(),
            form_id: opp.form_id,
            application_form: from_optional_column(opp.application_form.as_deref())?,
            moderation: (&opp.meta).into(),
        })
    }
}

// ============ Projects ============

/// Project
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub repository_url: Option<String>,
    pub meta: ContentMeta,
}

impl Entity for Project {
    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }
}

impl Content for Project {
    const KIND: ContentKind = ContentKind::Project;

    fn title(&self) -> &str {
        &self.title
    }

    fn meta(&self) -> &ContentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ContentMeta {
        &mut self.meta
    }
}

/// Project creation request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub repository_url: Option<String>,
}

/// Project as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub repository_url: Option<String>,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            description: project.description.clone(),
            category: project.category.clone(),
            tags: project.tags.clone(),
            repository_url: project.repository_url.clone(),
            moderation: (&project.meta).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let day = parse_timestamp("2025-03-14").unwrap();
        assert_eq!((day.year(), day.month(), day.day(), day.hour()), (2025, 3, 14, 0));

        let ts = parse_timestamp("2025-03-14T18:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 16);

        assert!(parse_timestamp("14/03/2025").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_review_item_flattens_moderation() {
        let project = Project {
            id: Uuid::new_v4(),
            title: "Mesh radio".into(),
            description: "d".into(),
            category: "hardware".into(),
            tags: vec![],
            repository_url: None,
            meta: ContentMeta::new(Uuid::new_v4()),
        };
        let json = serde_json::to_value(ReviewItem::of(&project)).unwrap();
        assert_eq!(json["kind"], "project");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["title"], "Mesh radio");
    }

    #[test]
    fn test_error_envelope_omits_details() {
        let json = serde_json::to_value(ApiResponse::<()>::error("NOT_FOUND", "missing")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json["error"].get("details").is_none());
    }
}
