//! API Routes

pub mod admin;
pub mod events;
pub mod forms;
pub mod health;
pub mod opportunities;
pub mod projects;

use agora_common::{ContentMeta, ContentStatus, RepositoryError};
use agora_forms::codec::to_column;
use agora_forms::{ensure_valid, Payload};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthUser;
use crate::ApiState;

/// Part-name prefix of an attached form (`formTitle`, `formSections`, ...)
pub const FORM_PREFIX: &str = "form";

/// Trimmed, non-blank text part. Callers check presence with `Payload::require`.
fn text_part(payload: &Payload, name: &str) -> String {
    payload.non_blank(name).unwrap_or_default().trim().to_string()
}

fn optional_text(payload: &Payload, name: &str) -> Option<String> {
    payload.non_blank(name).map(|v| v.trim().to_string())
}

fn timestamp_part(payload: &Payload, name: &str) -> ApiResult<Option<DateTime<Utc>>> {
    payload
        .non_blank(name)
        .map(|v| {
            crate::models::parse_timestamp(v)
                .ok_or_else(|| ApiError::BadRequest(format!("`{name}` is not a valid date")))
        })
        .transpose()
}

fn list_part(payload: &Payload, name: &str) -> ApiResult<Option<Vec<String>>> {
    let values = payload.json::<Vec<String>>(name)?;
    Ok(values.map(|v| {
        v.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }))
}

/// `formId` part, checked against the form store
async fn form_id_part(state: &ApiState, payload: &Payload) -> ApiResult<Option<Uuid>> {
    let Some(raw) = payload.non_blank("formId") else {
        return Ok(None);
    };
    let id = Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest("`formId` is not a valid id".into()))?;
    match state.forms.get(id).await {
        Ok(_) => Ok(Some(id)),
        Err(RepositoryError::NotFound(_)) => Err(ApiError::BadRequest(format!("form {id} does not exist"))),
        Err(e) => Err(e.into()),
    }
}

/// Attached form definition, checked and encoded for its JSON column
fn form_part(payload: &Payload) -> ApiResult<Option<String>> {
    let Some(form) = payload.form(FORM_PREFIX)? else {
        return Ok(None);
    };
    let warnings = ensure_valid(&form)?;
    for issue in &warnings {
        tracing::warn!(%issue, "attached form saved with warning");
    }
    Ok(Some(to_column(&form)?))
}

/// Update moderation state after an edit
///
/// An author editing rejected content sends it back to review; admin edits
/// and edits to pending or approved content keep their status.
fn record_edit(meta: &mut ContentMeta, editor: &AuthUser) {
    if !editor.is_admin() && meta.status == ContentStatus::Rejected {
        meta.resubmit();
    } else {
        meta.touch();
    }
}

/// Unapproved content is visible to its author and admins only
fn ensure_visible(meta: &ContentMeta, viewer: Option<&AuthUser>) -> ApiResult<()> {
    let allowed = meta.is_public() || viewer.is_some_and(|u| u.is_admin() || u.id == meta.author_id);
    if allowed {
        Ok(())
    } else {
        Err(ApiError::NotFound("no such content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::Role;
    use agora_common::ContentKind;

    fn user(role: Role) -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: "u@example.org".into(), role }
    }

    #[test]
    fn test_author_edit_resubmits_rejected() {
        let author = user(Role::Member);
        let mut meta = ContentMeta::new(author.id);
        meta.reject(ContentKind::Event, Uuid::new_v4(), Uuid::new_v4(), None);
        record_edit(&mut meta, &author);
        assert_eq!(meta.status, ContentStatus::Pending);
    }

    #[test]
    fn test_edit_keeps_approval() {
        let author = user(Role::Member);
        let mut meta = ContentMeta::new(author.id);
        meta.approve(ContentKind::Event, Uuid::new_v4(), Uuid::new_v4());
        record_edit(&mut meta, &author);
        assert_eq!(meta.status, ContentStatus::Approved);

        meta.reject(ContentKind::Event, Uuid::new_v4(), Uuid::new_v4(), None);
        record_edit(&mut meta, &user(Role::Admin));
        assert_eq!(meta.status, ContentStatus::Rejected);
    }

    #[test]
    fn test_pending_hidden_from_strangers() {
        let author = user(Role::Member);
        let meta = ContentMeta::new(author.id);
        assert!(ensure_visible(&meta, None).is_err());
        assert!(ensure_visible(&meta, Some(&user(Role::Member))).is_err());
        assert!(ensure_visible(&meta, Some(&author)).is_ok());
        assert!(ensure_visible(&meta, Some(&user(Role::Admin))).is_ok());
    }

    #[test]
    fn test_parts() {
        let payload = Payload::builder()
            .text("startDate", "2025-06-01")
            .text("when", "someday")
            .text("tags", r#"[" rust ", "", "meetup"]"#)
            .build();
        assert!(timestamp_part(&payload, "startDate").unwrap().is_some());
        assert!(timestamp_part(&payload, "endDate").unwrap().is_none());
        assert!(matches!(timestamp_part(&payload, "when"), Err(ApiError::BadRequest(_))));
        assert_eq!(list_part(&payload, "tags").unwrap().unwrap(), vec!["rust", "meetup"]);
    }
}
