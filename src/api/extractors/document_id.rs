/*
 * Responsibility
 * - Path の String を DocumentId として受け取る
 * - 形式不正は store に届く前に 400 (INVALID_ID) で返す
 * - 全 resource で共通利用 (`/{resource}/{id}`, `/users/{id}/purchase`)
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::{error::AppError, services::document_id::DocumentId};

#[derive(Clone, Copy, Debug)]
pub struct PathId(pub DocumentId);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("INVALID_ID", "invalid id"))?;

        let id = raw
            .parse::<DocumentId>()
            .map_err(|e| AppError::bad_request("INVALID_ID", e.to_string()))?;

        Ok(Self(id))
    }
}
