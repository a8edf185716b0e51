//! Admin moderation endpoints

use std::sync::Arc;

use agora_common::{Content, ContentKind, ContentMeta, ModerationEvent, ModerationResult, Repository};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::middleware::auth::AdminUser;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/approve", post(approve))
        .route("/feature", post(feature))
        .route("/review-contents", get(review_contents))
}

/// Load a record, apply a moderation transition, save it and log the event
async fn moderate<T, F>(repo: &dyn Repository<T>, id: Uuid, transition: F) -> ApiResult<ReviewItem>
where
    T: Content,
    F: FnOnce(&mut ContentMeta, ContentKind, Uuid) -> ModerationResult<ModerationEvent> + Send,
{
    let mut item = repo.get(id).await?;
    let event = transition(item.meta_mut(), T::KIND, id)?;
    repo.save(&item).await?;
    event.log();
    Ok(ReviewItem::of(&item))
}

async fn collect<T: Content>(repo: &dyn Repository<T>, query: &ReviewQuery, out: &mut Vec<ReviewItem>) -> ApiResult<()> {
    if query.kind.is_some_and(|k| k != T::KIND) {
        return Ok(());
    }
    let status = query.status.unwrap_or_default();
    out.extend(
        repo.list()
            .await?
            .iter()
            .filter(|item| item.meta().status == status)
            .map(ReviewItem::of),
    );
    Ok(())
}

/// Approve or reject content
#[utoipa::path(
    post,
    path = "/api/admin/approve",
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Moderation applied", body = ReviewItem),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn approve(
    State(state): State<Arc<ApiState>>,
    admin: AdminUser,
    Json(req): Json<ApproveRequest>,
) -> ApiResult<Json<ApiResponse<ReviewItem>>> {
    let AdminUser(admin) = admin;
    let decide = |meta: &mut ContentMeta, kind: ContentKind, id: Uuid| -> ModerationResult<ModerationEvent> {
        Ok(if req.approved {
            meta.approve(kind, id, admin.id)
        } else {
            meta.reject(kind, id, admin.id, req.reason.clone())
        })
    };

    let item = match req.kind {
        ContentKind::Event => moderate(state.events.as_ref(), req.id, decide).await?,
        ContentKind::Opportunity => moderate(state.opportunities.as_ref(), req.id, decide).await?,
        ContentKind::Project => moderate(state.projects.as_ref(), req.id, decide).await?,
    };
    Ok(Json(ApiResponse::success(item)))
}

/// Feature or unfeature content
#[utoipa::path(
    post,
    path = "/api/admin/feature",
    request_body = FeatureRequest,
    responses(
        (status = 200, description = "Featured flag updated", body = ReviewItem),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 409, description = "Only approved content can be featured", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn feature(
    State(state): State<Arc<ApiState>>,
    admin: AdminUser,
    Json(req): Json<FeatureRequest>,
) -> ApiResult<Json<ApiResponse<ReviewItem>>> {
    let AdminUser(admin) = admin;
    let toggle =
        |meta: &mut ContentMeta, kind: ContentKind, id: Uuid| meta.set_featured(kind, id, admin.id, req.featured);

    let item = match req.kind {
        ContentKind::Event => moderate(state.events.as_ref(), req.id, toggle).await?,
        ContentKind::Opportunity => moderate(state.opportunities.as_ref(), req.id, toggle).await?,
        ContentKind::Project => moderate(state.projects.as_ref(), req.id, toggle).await?,
    };
    Ok(Json(ApiResponse::success(item)))
}

/// Content awaiting (or past) review, across kinds
#[utoipa::path(
    get,
    path = "/api/admin/review-contents",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Matching content, oldest first", body = [ReviewItem]),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn review_contents(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ReviewItem>>>> {
    let mut items = Vec::new();
    collect(state.events.as_ref(), &query, &mut items).await?;
    collect(state.opportunities.as_ref(), &query, &mut items).await?;
    collect(state.projects.as_ref(), &query, &mut items).await?;
    items.sort_by_key(|item| (item.moderation.created_at, item.id));
    Ok(Json(ApiResponse::success(items)))
}
