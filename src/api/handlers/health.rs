/*
 * Responsibility
 * - GET / (起動確認用バナー)
 * - GET /health (疎通用, store backend 名を返す)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn banner() -> &'static str {
    "AI Verse Backend is Running 🚀"
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "store": state.store.backend_name()})),
    )
}
