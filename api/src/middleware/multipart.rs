//! Multipart bodies as submission payloads

use agora_forms::Payload;
use axum::extract::{FromRequest, Multipart, Request};

use crate::error::ApiError;

/// Text parts of a `multipart/form-data` body
///
/// File parts are skipped; upload storage is handled elsewhere.
#[derive(Debug)]
pub struct MultipartPayload(pub Payload);

#[axum::async_trait]
impl<S: Send + Sync> FromRequest<S> for MultipartPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut payload = Payload::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if field.file_name().is_some() {
                tracing::debug!(part = %name, "skipping file part");
                continue;
            }
            let value = field.text().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
            payload.insert(name, value);
        }
        Ok(Self(payload))
    }
}
