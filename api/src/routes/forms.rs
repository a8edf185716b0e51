//! Form definition endpoints

use std::sync::Arc;

use agora_forms::codec::{from_column, to_column};
use agora_forms::{ensure_valid, validate, FormDefinition, FormState, Responses};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", post(create_form))
        .route("/:id", get(get_form))
        .route("/:id/responses", post(submit_response))
}

/// Save a form definition
///
/// Definitions with error-level issues (duplicate ids, rules watching a
/// missing field) are refused; warnings are returned with the saved form.
#[utoipa::path(
    post,
    path = "/api/forms",
    request_body(content = serde_json::Value, content_type = "application/json", description = "Form definition"),
    responses(
        (status = 201, description = "Form saved", body = FormView),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 422, description = "Definition has errors", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn create_form(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(definition): Json<FormDefinition>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FormView>>)> {
    let warnings = ensure_valid(&definition)?;
    for issue in &warnings {
        tracing::warn!(%issue, "form saved with warning");
    }

    let now = Utc::now();
    let stored = StoredForm {
        id: Uuid::new_v4(),
        owner_id: user.id,
        definition: to_column(&definition)?,
        created_at: now,
        updated_at: now,
    };
    state.forms.insert(&stored).await?;
    tracing::info!(form_id = %stored.id, owner = %user.id, fields = definition.field_count(), "form created");

    let view = FormView {
        id: stored.id,
        owner_id: stored.owner_id,
        definition,
        warnings,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

/// Get a form definition
#[utoipa::path(
    get,
    path = "/api/forms/{id}",
    params(("id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form definition", body = FormView),
        (status = 404, description = "Form not found", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn get_form(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<FormView>>> {
    let stored = state.forms.get(id).await?;
    Ok(Json(ApiResponse::success(FormView::try_from(&stored)?)))
}

/// Validate a response against a form
///
/// Conditional logic is applied first: hidden fields are ignored and
/// `require` rules make their field mandatory. Returns the effective state.
#[utoipa::path(
    post,
    path = "/api/forms/{id}/responses",
    params(("id" = Uuid, Path, description = "Form ID")),
    request_body(content = serde_json::Value, content_type = "application/json", description = "Answers keyed by field id"),
    responses(
        (status = 200, description = "Response accepted; effective field state"),
        (status = 401, description = "Form requires sign-in", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse),
        (status = 409, description = "Form is closed", body = ErrorResponse),
        (status = 422, description = "Field errors in `details`", body = ErrorResponse)
    ),
    tag = "forms"
)]
pub async fn submit_response(
    State(state): State<Arc<ApiState>>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
    Json(responses): Json<Responses>,
) -> ApiResult<Json<ApiResponse<FormState>>> {
    let stored = state.forms.get(id).await?;
    let form = from_column(&stored.definition)?;
    form.ensure_open(Utc::now())?;
    if form.settings.require_login && user.is_none() {
        return Err(ApiError::Unauthorized("sign in to respond to this form".into()));
    }

    let evaluated = validate(&form, &responses).map_err(|errors| {
        tracing::warn!(form_id = %id, errors = errors.len(), "form response rejected");
        ApiError::Validation(errors)
    })?;
    tracing::info!(
        form_id = %id,
        hidden = evaluated.hidden_count(),
        jumps = evaluated.jump_targets().len(),
        "form response accepted"
    );
    Ok(Json(ApiResponse::success(evaluated)))
}
