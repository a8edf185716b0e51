//! Agora Platform API
//!
//! REST API for community content: events, opportunities and projects,
//! the dynamic forms attached to them, and admin moderation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          AGORA API (axum)                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │  Cookie / Bearer JWT  │  Multipart payloads  │  OpenAPI /docs │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │                                                                     │
//! │  ┌────────────┐  ┌────────────┐  ┌───────────────┐  ┌────────────┐  │
//! │  │   forms    │  │   events   │  │ opportunities │  │  projects  │  │
//! │  └─────┬──────┘  └─────┬──────┘  └───────┬───────┘  └─────┬──────┘  │
//! │        │ agora-forms   │                 │   admin moderation       │
//! │  ┌─────▼───────────────▼─────────────────▼────────────────▼──────┐  │
//! │  │            agora-common repositories (last write wins)        │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod config;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod middleware;
#[allow(missing_docs)]
pub mod models;
#[allow(missing_docs)]
pub mod routes;

use std::sync::Arc;

use agora_common::{InMemoryRepository, Repository};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use models::*;

/// API state
pub struct ApiState {
    /// API version
    pub version: String,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Stand-alone form definitions
    pub forms: Arc<dyn Repository<StoredForm>>,
    /// Events
    pub events: Arc<dyn Repository<Event>>,
    /// Opportunities
    pub opportunities: Arc<dyn Repository<Opportunity>>,
    /// Projects
    pub projects: Arc<dyn Repository<Project>>,
}

impl ApiState {
    /// State backed by in-memory repositories
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").into(),
            jwt_secret: jwt_secret.into(),
            forms: Arc::new(InMemoryRepository::new()),
            events: Arc::new(InMemoryRepository::new()),
            opportunities: Arc::new(InMemoryRepository::new()),
            projects: Arc::new(InMemoryRepository::new()),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agora API",
        description = "Agora community platform API - events, opportunities, projects and dynamic forms",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::forms::create_form,
        routes::forms::get_form,
        routes::forms::submit_response,
        routes::events::list_events,
        routes::events::get_event,
        routes::events::create_event,
        routes::events::replace_event,
        routes::opportunities::list_opportunities,
        routes::opportunities::get_opportunity,
        routes::opportunities::create_opportunity,
        routes::opportunities::patch_opportunity,
        routes::projects::list_projects,
        routes::projects::create_project,
        routes::admin::approve,
        routes::admin::feature,
        routes::admin::review_contents,
    ),
    components(
        schemas(
            ErrorResponse, Moderation,
            FormView,
            EventView,
            OpportunityView,
            ProjectView, ProjectCreate,
            ApproveRequest, FeatureRequest, ReviewItem,
            routes::health::HealthResponse
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "forms", description = "Form definitions and response validation"),
        (name = "events", description = "Community events"),
        (name = "opportunities", description = "Jobs, grants and calls for participation"),
        (name = "projects", description = "Community projects"),
        (name = "admin", description = "Content moderation")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(config.max_body_bytes)),
        )
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .nest("/forms", routes::forms::router())
        .nest("/events", routes::events::router())
        .nest("/opportunities", routes::opportunities::router())
        .nest("/projects", routes::projects::router())
        .nest("/admin", routes::admin::router())
}
