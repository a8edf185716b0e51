//! Opportunity endpoints
//!
//! `PATCH` only changes the parts present in the body. A present but blank
//! optional part clears it; a blank required part is refused.

use std::sync::Arc;

use agora_common::ContentMeta;
use agora_forms::Payload;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use super::{ensure_visible, form_id_part, form_part, list_part, optional_text, record_edit, text_part, timestamp_part, FORM_PREFIX};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::multipart::MultipartPayload;
use crate::models::*;
use crate::ApiState;

const REQUIRED_PARTS: &[&str] = &["title", "description", "category"];

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_opportunities).post(create_opportunity))
        .route("/:id", get(get_opportunity).patch(patch_opportunity))
}

/// Apply the parts present in `payload`
async fn apply_parts(state: &ApiState, opp: &mut Opportunity, payload: &Payload) -> ApiResult<()> {
    for (name, slot) in [
        ("title", &mut opp.title),
        ("description", &mut opp.description),
        ("category", &mut opp.category),
    ] {
        if payload.contains(name) {
            payload.require(&[name])?;
            *slot = text_part(payload, name);
        }
    }

    if payload.contains("organization") {
        opp.organization = optional_text(payload, "organization");
    }
    if payload.contains("location") {
        opp.location = optional_text(payload, "location");
    }
    if payload.contains("deadline") {
        opp.deadline = timestamp_part(payload, "deadline")?;
    }
    if payload.contains("tags") {
        opp.tags = list_part(payload, "tags")?.unwrap_or_default();
    }
    if payload.contains("requirements") {
        opp.requirements = list_part(payload, "requirements")?.unwrap_or_default();
    }
    if payload.contains("formId") {
        opp.form_id = form_id_part(state, payload).await?;
    }
    if payload.contains(&format!("{FORM_PREFIX}Sections")) {
        opp.application_form = form_part(payload)?;
    }
    Ok(())
}

/// List approved opportunities
#[utoipa::path(
    get,
    path = "/api/opportunities",
    params(ListQuery),
    responses(
        (status = 200, description = "Approved opportunities, oldest first", body = [OpportunityView])
    ),
    tag = "opportunities"
)]
pub async fn list_opportunities(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<OpportunityView>>>> {
    let opportunities = state
        .opportunities
        .list()
        .await?
        .iter()
        .filter(|o| query.admits(&o.meta))
        .map(OpportunityView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ApiResponse::success(opportunities)))
}

/// Get an opportunity
#[utoipa::path(
    get,
    path = "/api/opportunities/{id}",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    responses(
        (status = 200, description = "Opportunity details", body = OpportunityView),
        (status = 404, description = "Opportunity not found or not yet approved", body = ErrorResponse)
    ),
    tag = "opportunities"
)]
pub async fn get_opportunity(
    State(state): State<Arc<ApiState>>,
    viewer: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<OpportunityView>>> {
    let opp = state.opportunities.get(id).await?;
    ensure_visible(&opp.meta, viewer.as_ref())?;
    Ok(Json(ApiResponse::success(OpportunityView::try_from(&opp)?)))
}

/// Submit an opportunity for review
#[utoipa::path(
    post,
    path = "/api/opportunities",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "title, description, category, organization, deadline, location, tags (JSON), requirements (JSON), formId, formTitle, formDescription, formSections (JSON), formSettings (JSON)"
    ),
    responses(
        (status = 201, description = "Opportunity created, pending review", body = OpportunityView),
        (status = 400, description = "Missing or malformed parts", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 422, description = "Attached form has errors", body = ErrorResponse)
    ),
    tag = "opportunities"
)]
pub async fn create_opportunity(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    multipart: MultipartPayload,
) -> ApiResult<(StatusCode, Json<ApiResponse<OpportunityView>>)> {
    let MultipartPayload(payload) = multipart;
    payload.require(REQUIRED_PARTS)?;
    let mut opp = Opportunity {
        id: Uuid::new_v4(),
        title: String::new(),
        description: String::new(),
        category: String::new(),
        organization: None,
        deadline: None,
        location: None,
        tags: Vec::new(),
        requirements: Vec::new(),
        form_id: None,
        application_form: None,
        meta: ContentMeta::new(user.id),
    };
    apply_parts(&state, &mut opp, &payload).await?;
    state.opportunities.insert(&opp).await?;
    tracing::info!(opportunity_id = %opp.id, author = %user.id, "opportunity submitted");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(OpportunityView::try_from(&opp)?))))
}

/// Update part of an opportunity
#[utoipa::path(
    patch,
    path = "/api/opportunities/{id}",
    params(("id" = Uuid, Path, description = "Opportunity ID")),
    request_body(content = String, content_type = "multipart/form-data", description = "Any subset of the create parts"),
    responses(
        (status = 200, description = "Opportunity updated", body = OpportunityView),
        (status = 400, description = "Blank required part or malformed value", body = ErrorResponse),
        (status = 403, description = "Not the author or an admin", body = ErrorResponse),
        (status = 404, description = "Opportunity not found", body = ErrorResponse)
    ),
    tag = "opportunities"
)]
pub async fn patch_opportunity(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    multipart: MultipartPayload,
) -> ApiResult<Json<ApiResponse<OpportunityView>>> {
    let MultipartPayload(payload) = multipart;
    let mut opp = state.opportunities.get(id).await?;
    user.ensure_can_edit(opp.meta.author_id)?;
    if payload.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".into()));
    }

    apply_parts(&state, &mut opp, &payload).await?;
    record_edit(&mut opp.meta, &user);
    state.opportunities.save(&opp).await?;
    tracing::info!(opportunity_id = %id, editor = %user.id, parts = payload.len(), "opportunity updated");
    Ok(Json(ApiResponse::success(OpportunityView::try_from(&opp)?)))
}
