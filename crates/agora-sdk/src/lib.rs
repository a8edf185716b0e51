//! Agora Rust SDK
//!
//! Async client for the Agora platform API.
//!
//! # Example
//!
//! ```rust,no_run
//! use agora_forms::{FieldDraft, FieldType, FormBuilder};
//! use agora_sdk::{AgoraClient, EventDraft, Result};
//!
//! # async fn run() -> Result<()> {
//! let client = AgoraClient::new("http://localhost:8080")?.with_token("eyJ...");
//!
//! let mut form = FormBuilder::new("Registration", "");
//! form.add_section("Personal Information", None);
//! form.add_custom_field(0, FieldDraft::new("Full Name", FieldType::Text).required(true));
//!
//! let start = chrono::Utc::now();
//! let draft = EventDraft::new("Rust meetup", "Monthly meetup", "meetup", start, start)
//!     .tags(["rust"])
//!     .registration_form(form.build());
//! let event = client.create_event(&draft).await?;
//! println!("submitted {} ({})", event.id, event.moderation.status);
//! # Ok(())
//! # }
//! ```
//!
//! Multipart bodies go through [`agora_forms::Payload`], so every array
//! value (tags, requirements, form sections) is JSON-stringified into a
//! single part. Requests are never retried.

use std::time::Duration;

use agora_forms::{FormDefinition, FormState, Payload, Responses};
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub use agora_common::{ContentKind, ContentStatus};
pub use drafts::*;
pub use error::*;
pub use types::*;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cookie the server reads the session token from
pub const SESSION_COOKIE: &str = "token";

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, ClientError>;

// =============================================================================
// Error Types
// =============================================================================

pub mod error {
    use agora_forms::{FieldError, PayloadError};
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ClientError {
        /// Non-2xx response from the server
        #[error("API error {status}: {code} - {message}")]
        Api {
            status: u16,
            code: String,
            message: String,
            /// Per-field errors of a rejected form response
            field_errors: Vec<FieldError>,
        },

        /// Transport failure
        #[error("HTTP error: {0}")]
        Http(#[from] reqwest::Error),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("URL error: {0}")]
        Url(#[from] url::ParseError),

        /// A draft could not be encoded as a multipart payload
        #[error("payload error: {0}")]
        Payload(#[from] PayloadError),
    }

    impl ClientError {
        pub fn status(&self) -> Option<u16> {
            match self {
                Self::Api { status, .. } => Some(*status),
                _ => None,
            }
        }

        pub fn is_not_found(&self) -> bool {
            self.status() == Some(404)
        }

        pub fn is_unauthorized(&self) -> bool {
            matches!(self.status(), Some(401 | 403))
        }
    }
}

// =============================================================================
// Types
// =============================================================================

pub mod types {
    use super::*;
    use agora_forms::DefinitionIssue;
    use chrono::{DateTime, Utc};

    /// Moderation state flattened into every content record
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Moderation {
        pub author_id: Uuid,
        pub status: ContentStatus,
        pub featured: bool,
        #[serde(default)]
        pub rejection_reason: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// A saved form definition
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StoredForm {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub definition: FormDefinition,
        #[serde(default)]
        pub warnings: Vec<DefinitionIssue>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Event {
        pub id: Uuid,
        pub title: String,
        pub description: String,
        pub category: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
        #[serde(default)]
        pub form_id: Option<Uuid>,
        #[serde(default)]
        pub registration_form: Option<FormDefinition>,
        #[serde(flatten)]
        pub moderation: Moderation,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Opportunity {
        pub id: Uuid,
        pub title: String,
        pub description: String,
        pub category: String,
        #[serde(default)]
        pub organization: Option<String>,
        #[serde(default)]
        pub deadline: Option<DateTime<Utc>>,
        #[serde(default)]
        pub location: Option<String>,
        #[serde(default)]
        pub tags: Vec<String>,
        #[serde(default)]
        pub requirements: Vec<String>,
        #[serde(default)]
        pub form_id: Option<Uuid>,
        #[serde(default)]
        pub application_form: Option<FormDefinition>,
        #[serde(flatten)]
        pub moderation: Moderation,
    }

    /// Review queue entry, also returned by moderation calls
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReviewItem {
        pub kind: ContentKind,
        pub id: Uuid,
        pub title: String,
        #[serde(flatten)]
        pub moderation: Moderation,
    }
}

// =============================================================================
// Drafts
// =============================================================================

pub mod drafts {
    use super::*;
    use agora_forms::{PayloadBuilder, PayloadError};
    use chrono::{DateTime, Utc};

    /// Part-name prefix of an attached form
    const FORM_PREFIX: &str = "form";

    fn with_form(builder: PayloadBuilder, form: Option<&FormDefinition>) -> std::result::Result<PayloadBuilder, PayloadError> {
        match form {
            Some(form) => builder.form(FORM_PREFIX, form),
            None => Ok(builder),
        }
    }

    /// Every property of an event, for create and replace
    #[derive(Debug, Clone)]
    pub struct EventDraft {
        pub title: String,
        pub description: String,
        pub category: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub location: Option<String>,
        pub tags: Vec<String>,
        pub form_id: Option<Uuid>,
        pub registration_form: Option<FormDefinition>,
    }

    impl EventDraft {
        pub fn new(
            title: impl Into<String>,
            description: impl Into<String>,
            category: impl Into<String>,
            start_date: DateTime<Utc>,
            end_date: DateTime<Utc>,
        ) -> Self {
            Self {
                title: title.into(),
                description: description.into(),
                category: category.into(),
                start_date,
                end_date,
                location: None,
                tags: Vec::new(),
                form_id: None,
                registration_form: None,
            }
        }

        pub fn location(mut self, location: impl Into<String>) -> Self {
            self.location = Some(location.into());
            self
        }

        pub fn tags<I, S>(mut self, tags: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.tags = tags.into_iter().map(Into::into).collect();
            self
        }

        pub fn form_id(mut self, form_id: Uuid) -> Self {
            self.form_id = Some(form_id);
            self
        }

        pub fn registration_form(mut self, form: FormDefinition) -> Self {
            self.registration_form = Some(form);
            self
        }

        pub fn to_payload(&self) -> std::result::Result<Payload, PayloadError> {
            let builder = Payload::builder()
                .text("title", self.title.as_str())
                .text("description", self.description.as_str())
                .text("category", self.category.as_str())
                .text("startDate", self.start_date.to_rfc3339())
                .text("endDate", self.end_date.to_rfc3339())
                .opt_text("location", self.location.as_deref())
                .opt_text("formId", self.form_id.map(|id| id.to_string()))
                .json("tags", &self.tags)?;
            Ok(with_form(builder, self.registration_form.as_ref())?.build())
        }
    }

    /// A new opportunity
    #[derive(Debug, Clone, Default)]
    pub struct OpportunityDraft {
        pub title: String,
        pub description: String,
        pub category: String,
        pub organization: Option<String>,
        pub deadline: Option<DateTime<Utc>>,
        pub location: Option<String>,
        pub tags: Vec<String>,
        pub requirements: Vec<String>,
        pub form_id: Option<Uuid>,
        pub application_form: Option<FormDefinition>,
    }

    impl OpportunityDraft {
        pub fn new(title: impl Into<String>, description: impl Into<String>, category: impl Into<String>) -> Self {
            Self {
                title: title.into(),
                description: description.into(),
                category: category.into(),
                ..Default::default()
            }
        }

        pub fn to_payload(&self) -> std::result::Result<Payload, PayloadError> {
            let builder = Payload::builder()
                .text("title", self.title.as_str())
                .text("description", self.description.as_str())
                .text("category", self.category.as_str())
                .opt_text("organization", self.organization.as_deref())
                .opt_text("deadline", self.deadline.map(|d| d.to_rfc3339()))
                .opt_text("location", self.location.as_deref())
                .opt_text("formId", self.form_id.map(|id| id.to_string()))
                .json("tags", &self.tags)?
                .json("requirements", &self.requirements)?;
            Ok(with_form(builder, self.application_form.as_ref())?.build())
        }
    }

    /// Partial opportunity update; only `Some` members are sent.
    ///
    /// Nullable members use `Some(None)` to clear the stored value.
    #[derive(Debug, Clone, Default)]
    pub struct OpportunityPatch {
        pub title: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub organization: Option<Option<String>>,
        pub deadline: Option<Option<DateTime<Utc>>>,
        pub location: Option<Option<String>>,
        pub tags: Option<Vec<String>>,
        pub requirements: Option<Vec<String>>,
        pub form_id: Option<Option<Uuid>>,
        pub application_form: Option<Option<FormDefinition>>,
    }

    impl OpportunityPatch {
        pub fn to_payload(&self) -> std::result::Result<Payload, PayloadError> {
            let clearable = |value: &Option<Option<String>>| value.as_ref().map(|v| v.clone().unwrap_or_default());

            let mut builder = Payload::builder()
                .opt_text("title", self.title.as_deref())
                .opt_text("description", self.description.as_deref())
                .opt_text("category", self.category.as_deref())
                .opt_text("organization", clearable(&self.organization))
                .opt_text("location", clearable(&self.location))
                .opt_text(
                    "deadline",
                    self.deadline.map(|d| d.map(|d| d.to_rfc3339()).unwrap_or_default()),
                )
                .opt_text(
                    "formId",
                    self.form_id.map(|id| id.map(|id| id.to_string()).unwrap_or_default()),
                );
            if let Some(tags) = &self.tags {
                builder = builder.json("tags", tags)?;
            }
            if let Some(requirements) = &self.requirements {
                builder = builder.json("requirements", requirements)?;
            }
            match &self.application_form {
                Some(Some(form)) => builder = builder.form(FORM_PREFIX, form)?,
                Some(None) => builder = builder.text(&format!("{FORM_PREFIX}Sections"), ""),
                None => {}
            }
            Ok(builder.build())
        }
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApproveBody<'a> {
    kind: ContentKind,
    id: Uuid,
    approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
struct FeatureBody {
    kind: ContentKind,
    id: Uuid,
    featured: bool,
}

/// Agora API client
#[derive(Debug, Clone)]
pub struct AgoraClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl AgoraClient {
    /// Client for the service at `base_url`, e.g. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("agora-sdk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            token: None,
            http,
        })
    }

    /// Send `token` as the session cookie on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn create_form(&self, form: &FormDefinition) -> Result<StoredForm> {
        let request = self.request(Method::POST, "/api/forms", &[])?.json(form);
        self.send(request).await
    }

    pub async fn get_form(&self, id: Uuid) -> Result<StoredForm> {
        let request = self.request(Method::GET, &format!("/api/forms/{id}"), &[])?;
        self.send(request).await
    }

    /// Validate answers against a form; returns the effective field state
    pub async fn submit_response(&self, form_id: Uuid, responses: &Responses) -> Result<FormState> {
        let request = self
            .request(Method::POST, &format!("/api/forms/{form_id}/responses"), &[])?
            .json(responses);
        self.send(request).await
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        let request = self.multipart(Method::POST, "/api/events", draft.to_payload()?)?;
        self.send(request).await
    }

    /// Replace every property of an event
    pub async fn update_event(&self, id: Uuid, draft: &EventDraft) -> Result<Event> {
        let request = self.multipart(Method::PUT, &format!("/api/events/{id}"), draft.to_payload()?)?;
        self.send(request).await
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event> {
        let request = self.request(Method::GET, &format!("/api/events/{id}"), &[])?;
        self.send(request).await
    }

    /// Approved events, optionally only featured ones
    pub async fn list_events(&self, featured: Option<bool>) -> Result<Vec<Event>> {
        let flag = featured.map(|f| f.to_string());
        let params: Vec<(&str, &str)> = flag.iter().map(|f| ("featured", f.as_str())).collect();
        let request = self.request(Method::GET, "/api/events", &params)?;
        self.send(request).await
    }

    pub async fn create_opportunity(&self, draft: &OpportunityDraft) -> Result<Opportunity> {
        let request = self.multipart(Method::POST, "/api/opportunities", draft.to_payload()?)?;
        self.send(request).await
    }

    pub async fn patch_opportunity(&self, id: Uuid, patch: &OpportunityPatch) -> Result<Opportunity> {
        let request = self.multipart(Method::PATCH, &format!("/api/opportunities/{id}"), patch.to_payload()?)?;
        self.send(request).await
    }

    /// Approve, or reject with an optional reason
    pub async fn approve(&self, kind: ContentKind, id: Uuid, approved: bool, reason: Option<&str>) -> Result<ReviewItem> {
        let body = ApproveBody { kind, id, approved, reason };
        let request = self.request(Method::POST, "/api/admin/approve", &[])?.json(&body);
        self.send(request).await
    }

    pub async fn feature(&self, kind: ContentKind, id: Uuid, featured: bool) -> Result<ReviewItem> {
        let body = FeatureBody { kind, id, featured };
        let request = self.request(Method::POST, "/api/admin/feature", &[])?.json(&body);
        self.send(request).await
    }

    /// Review queue; the server defaults to pending content of every kind
    pub async fn review_contents(&self, status: Option<ContentStatus>, kind: Option<ContentKind>) -> Result<Vec<ReviewItem>> {
        let mut params = Vec::new();
        if let Some(status) = status {
            params.push(("status", status.as_str()));
        }
        if let Some(kind) = kind {
            params.push(("kind", kind.as_str()));
        }
        let request = self.request(Method::GET, "/api/admin/review-contents", &params)?;
        self.send(request).await
    }

    fn request(&self, method: Method, path: &str, params: &[(&str, &str)]) -> Result<reqwest::RequestBuilder> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut request = self.http.request(method, url).header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
        }
        Ok(request)
    }

    fn multipart(&self, method: Method, path: &str, payload: Payload) -> Result<reqwest::RequestBuilder> {
        let form = payload
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| form.text(name, value));
        Ok(self.request(method, path, &[])?.multipart(form))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "agora api response");

        if status.is_success() {
            let envelope: Envelope<T> = serde_json::from_slice(&body)?;
            return envelope.data.ok_or_else(|| ClientError::Api {
                status: status.as_u16(),
                code: "EMPTY_RESPONSE".into(),
                message: "response carried no data".into(),
                field_errors: Vec::new(),
            });
        }
        Err(api_error(status, &body))
    }
}

fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    let parsed = serde_json::from_slice::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.error);

    match parsed {
        Some(error) => ClientError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
            field_errors: error
                .details
                .and_then(|details| serde_json::from_value(details).ok())
                .unwrap_or_default(),
        },
        None => ClientError::Api {
            status: status.as_u16(),
            code: status.canonical_reason().unwrap_or("UNKNOWN").to_uppercase().replace(' ', "_"),
            message: String::from_utf8_lossy(body).into_owned(),
            field_errors: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(matches!(AgoraClient::new("not a url"), Err(ClientError::Url(_))));
        let client = AgoraClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_event_draft_stringifies_arrays() {
        let start = chrono::Utc::now();
        let payload = EventDraft::new("Meetup", "Monthly", "meetup", start, start)
            .tags(["rust", "community"])
            .to_payload()
            .unwrap();
        assert_eq!(payload.text("tags"), Some(r#"["rust","community"]"#));
        assert!(!payload.contains("formSections"));
        assert!(!payload.contains("location"));
        payload
            .require(&["title", "description", "category", "startDate", "endDate"])
            .unwrap();
    }

    #[test]
    fn test_patch_sends_only_present_members() {
        let patch = OpportunityPatch {
            title: Some("Lead mentor".into()),
            organization: Some(None),
            ..Default::default()
        };
        let payload = patch.to_payload().unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload.text("organization"), Some(""));
        assert!(!payload.contains("tags"));
    }

    #[test]
    fn test_patch_clears_linked_and_attached_forms() {
        let patch = OpportunityPatch {
            form_id: Some(None),
            application_form: Some(None),
            ..Default::default()
        };
        let payload = patch.to_payload().unwrap();
        assert_eq!(payload.text("formId"), Some(""));
        assert_eq!(payload.text("formSections"), Some(""));
        assert_eq!(payload.form("form").unwrap(), None);

        let linked = Uuid::new_v4();
        let patch = OpportunityPatch {
            form_id: Some(Some(linked)),
            ..Default::default()
        };
        let payload = patch.to_payload().unwrap();
        assert_eq!(payload.text("formId"), Some(linked.to_string().as_str()));
        assert!(!payload.contains("formSections"));
    }

    #[test]
    fn test_error_without_envelope() {
        let err = api_error(StatusCode::BAD_GATEWAY, b"upstream down");
        match err {
            ClientError::Api { status, code, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(code, "BAD_GATEWAY");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
