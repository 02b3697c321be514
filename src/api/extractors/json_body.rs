//! JSON request body with the rejection folded into `AppError`.
//!
//! axum's `Json` answers 415/422 with a plain-text body; every client error
//! here is a 400 with the usual `{"error": {...}}` shape instead. A body over
//! the configured limit stays a 413, in the same shape.
use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::PayloadTooLarge {
                        message: rejection.body_text(),
                    }
                } else {
                    AppError::invalid_payload(rejection.body_text())
                }
            })?;

        Ok(Self(value))
    }
}
