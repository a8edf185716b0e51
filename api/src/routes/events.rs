//! Event endpoints
//!
//! Create and replace take `multipart/form-data`. Array values (`tags`,
//! `formSections`) arrive JSON-stringified.

use std::sync::Arc;

use agora_common::ContentMeta;
use agora_forms::Payload;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ensure_visible, form_id_part, form_part, list_part, optional_text, record_edit, text_part, timestamp_part};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::multipart::MultipartPayload;
use crate::models::*;
use crate::ApiState;

const REQUIRED_PARTS: &[&str] = &["title", "description", "category", "startDate", "endDate"];

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event).put(replace_event))
}

/// Every editable event property, read from one multipart body
struct EventInput {
    title: String,
    description: String,
    category: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    location: Option<String>,
    tags: Vec<String>,
    form_id: Option<Uuid>,
    registration_form: Option<String>,
}

impl EventInput {
    async fn read(state: &ApiState, payload: &Payload) -> ApiResult<Self> {
        payload.require(REQUIRED_PARTS)?;
        let (Some(start_date), Some(end_date)) =
            (timestamp_part(payload, "startDate")?, timestamp_part(payload, "endDate")?)
        else {
            return Err(ApiError::BadRequest("`startDate` and `endDate` are required".into()));
        };
        if end_date < start_date {
            return Err(ApiError::BadRequest("`endDate` must not be before `startDate`".into()));
        }

        Ok(Self {
            title: text_part(payload, "title"),
            description: text_part(payload, "description"),
            category: text_part(payload, "category"),
            start_date,
            end_date,
            location: optional_text(payload, "location"),
            tags: list_part(payload, "tags")?.unwrap_or_default(),
            form_id: form_id_part(state, payload).await?,
            registration_form: form_part(payload)?,
        })
    }

    fn into_event(self, id: Uuid, meta: ContentMeta) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            start_date: self.start_date,
            end_date: self.end_date,
            location: self.location,
            tags: self.tags,
            form_id: self.form_id,
            registration_form: self.registration_form,
            meta,
        }
    }
}

/// List approved events
#[utoipa::path(
    get,
    path = "/api/events",
    params(ListQuery),
    responses(
        (status = 200, description = "Approved events, oldest first", body = [EventView])
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<EventView>>>> {
    let events = state
        .events
        .list()
        .await?
        .iter()
        .filter(|e| query.admits(&e.meta))
        .map(EventView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ApiResponse::success(events)))
}

/// Get an event
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = EventView),
        (status = 404, description = "Event not found or not yet approved", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<Arc<ApiState>>,
    viewer: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<EventView>>> {
    let event = state.events.get(id).await?;
    ensure_visible(&event.meta, viewer.as_ref())?;
    Ok(Json(ApiResponse::success(EventView::try_from(&event)?)))
}

/// Submit an event for review
#[utoipa::path(
    post,
    path = "/api/events",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "title, description, category, startDate, endDate, location, tags (JSON), formId, formTitle, formDescription, formSections (JSON), formSettings (JSON)"
    ),
    responses(
        (status = 201, description = "Event created, pending review", body = EventView),
        (status = 400, description = "Missing or malformed parts", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 422, description = "Attached form has errors", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    multipart: MultipartPayload,
) -> ApiResult<(StatusCode, Json<ApiResponse<EventView>>)> {
    let MultipartPayload(payload) = multipart;
    let input = EventInput::read(&state, &payload).await?;
    let event = input.into_event(Uuid::new_v4(), ContentMeta::new(user.id));
    state.events.insert(&event).await?;
    tracing::info!(event_id = %event.id, author = %user.id, "event submitted");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(EventView::try_from(&event)?))))
}

/// Replace an event
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body(content = String, content_type = "multipart/form-data", description = "Same parts as create"),
    responses(
        (status = 200, description = "Event replaced", body = EventView),
        (status = 403, description = "Not the author or an admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn replace_event(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: MultipartPayload,
) -> ApiResult<Json<ApiResponse<EventView>>> {
    let MultipartPayload(payload) = multipart;
    let existing = state.events.get(id).await?;
    user.ensure_can_edit(existing.meta.author_id)?;

    let input = EventInput::read(&state, &payload).await?;
    let mut meta = existing.meta;
    record_edit(&mut meta, &user);
    let event = input.into_event(id, meta);
    state.events.save(&event).await?;
    tracing::info!(event_id = %id, editor = %user.id, status = %event.meta.status, "event replaced");
    Ok(Json(ApiResponse::success(EventView::try_from(&event)?)))
}
