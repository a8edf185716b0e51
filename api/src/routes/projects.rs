//! Project endpoints

use std::sync::Arc;

use agora_common::ContentMeta;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/", get(list_projects).post(create_project))
}

fn required(value: &str, name: &str) -> ApiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("`{name}` is required")));
    }
    Ok(value.to_string())
}

fn repository_url(raw: Option<&str>) -> ApiResult<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(url.to_string())),
        _ => Err(ApiError::BadRequest("`repositoryUrl` must be an http(s) URL".into())),
    }
}

/// List approved projects
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ListQuery),
    responses(
        (status = 200, description = "Approved projects, oldest first", body = [ProjectView])
    ),
    tag = "projects"
)]
pub async fn list_projects(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectView>>>> {
    let projects = state
        .projects
        .list()
        .await?
        .iter()
        .filter(|p| query.admits(&p.meta))
        .map(ProjectView::from)
        .collect();
    Ok(Json(ApiResponse::success(projects)))
}

/// Submit a project for review
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = ProjectCreate,
    responses(
        (status = 201, description = "Project created, pending review", body = ProjectView),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(input): Json<ProjectCreate>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProjectView>>)> {
    let project = Project {
        id: Uuid::new_v4(),
        title: required(&input.title, "title")?,
        description: required(&input.description, "description")?,
        category: required(&input.category, "category")?,
        tags: input
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        repository_url: repository_url(input.repository_url.as_deref())?,
        meta: ContentMeta::new(user.id),
    };
    state.projects.insert(&project).await?;
    tracing::info!(project_id = %project.id, author = %user.id, "project submitted");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(ProjectView::from(&project)))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_url() {
        assert_eq!(repository_url(None).unwrap(), None);
        assert_eq!(repository_url(Some("  ")).unwrap(), None);
        assert_eq!(
            repository_url(Some("https://github.com/agora/mesh")).unwrap().as_deref(),
            Some("https://github.com/agora/mesh")
        );
        assert!(repository_url(Some("ftp://example.org/repo")).is_err());
        assert!(repository_url(Some("not a url")).is_err());
    }
}
