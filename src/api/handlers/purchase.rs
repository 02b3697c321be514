/*
 * Responsibility
 * - POST /{resource}/{id}/purchase
 * - 販売数 (counter_field) を store の atomic increment で +1 し、更新後の document を返す
 */
use axum::{Json, extract::State};

use crate::{
    api::{extractors::PathId, handlers::resources::map_repo_error, resources::ResourceCtx},
    error::AppError,
    services::store::JsonDocument,
};

pub async fn record_purchase(
    State(ctx): State<ResourceCtx>,
    PathId(id): PathId,
) -> Result<Json<JsonDocument>, AppError> {
    // The route is only mounted for resources with a counter.
    let Some(field) = ctx.def.counter_field else {
        return Err(AppError::Internal);
    };

    let doc = ctx
        .repo
        .increment_field(id, field, 1)
        .await
        .map_err(|e| map_repo_error(&ctx, e))?;

    tracing::info!(collection = ctx.def.collection, %id, counter = field, "purchase recorded");

    Ok(Json(doc))
}
