//! JSON body extractor that matches object keys to fields ignoring case.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// Like `axum::Json`, but `{"Login": ..}` fills a `login` field. Malformed
/// bodies are rejected as bad requests.
#[derive(Clone, Debug)]
pub struct CaseInsensitiveJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for CaseInsensitiveJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let value = crate::json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
        Ok(CaseInsensitiveJson(value))
    }
}
