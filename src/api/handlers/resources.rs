/*
 * Responsibility
 * - 全 resource 共通の CRUD handler (list / get / create / update / delete)
 * - State として ResourceCtx (def + repo) を受け取る
 * - payload の形チェック、duplicate guard 用の必須項目チェック
 * - timestamp は store が付与 (def.timestamp_field を渡すだけ)
 * - RepoError → AppError は resource ごとの label / guard を使って変換
 */
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
    api::{
        dto::resources::{
            BatchCreatedResponse, CreatedResponse, DeletedResponse, ListQuery, UpdatedResponse,
        },
        extractors::{JsonBody, PathId},
        resources::{PayloadShape, ResourceCtx, ResourceDef},
    },
    error::AppError,
    repos::error::RepoError,
    services::store::JsonDocument,
};

pub(crate) fn map_repo_error(ctx: &ResourceCtx, e: RepoError) -> AppError {
    match e {
        RepoError::NotFound => AppError::not_found(ctx.def.label),
        RepoError::Duplicate => match &ctx.def.duplicate_guard {
            Some(guard) => AppError::bad_request(guard.code, guard.message),
            None => AppError::from(RepoError::Duplicate),
        },
        other => AppError::from(other),
    }
}

// Fields of a duplicate guard must be present; a missing key would collide on null.
fn require_guard_fields(def: &ResourceDef, doc: &JsonDocument) -> Result<(), AppError> {
    if let Some(guard) = &def.duplicate_guard {
        for field in guard.fields {
            if doc.get(*field).is_none_or(Value::is_null) {
                return Err(AppError::invalid_payload(format!("{field} is required")));
            }
        }
    }
    Ok(())
}

pub async fn list_documents(
    State(ctx): State<ResourceCtx>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<JsonDocument>>, AppError> {
    let Query(query) =
        query.map_err(|e| AppError::bad_request("INVALID_QUERY", e.body_text()))?;
    let filter = query
        .to_filter(ctx.def.search_field)
        .map_err(|m| AppError::bad_request("INVALID_QUERY", m))?;

    let docs = ctx
        .repo
        .list_all(filter.as_ref())
        .await
        .map_err(|e| map_repo_error(&ctx, e))?;

    Ok(Json(docs))
}

pub async fn get_document(
    State(ctx): State<ResourceCtx>,
    PathId(id): PathId,
) -> Result<Json<JsonDocument>, AppError> {
    let doc = ctx
        .repo
        .get_by_id(id)
        .await
        .map_err(|e| map_repo_error(&ctx, e))?;

    Ok(Json(doc))
}

pub async fn create_document(
    State(ctx): State<ResourceCtx>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let def = ctx.def;

    match (def.payload, body) {
        (PayloadShape::Many, Value::Array(docs)) => {
            let ids = ctx
                .repo
                .insert_many(docs)
                .await
                .map_err(|e| map_repo_error(&ctx, e))?;

            tracing::info!(
                collection = def.collection,
                count = ids.len(),
                "documents inserted"
            );

            let res = BatchCreatedResponse {
                message: format!("{}s created successfully", def.label),
                inserted_count: ids.len(),
                inserted_ids: ids.iter().map(|id| id.to_hex()).collect(),
            };
            Ok((StatusCode::CREATED, Json(res)).into_response())
        }
        (PayloadShape::Many, _) => Err(AppError::invalid_payload(format!(
            "Expected an array of {}s",
            def.label.to_lowercase()
        ))),
        (PayloadShape::Single, Value::Object(doc)) => {
            require_guard_fields(def, &doc)?;
            let id = ctx
                .repo
                .insert_one(doc, def.timestamp_field)
                .await
                .map_err(|e| map_repo_error(&ctx, e))?;

            tracing::info!(collection = def.collection, %id, "document inserted");

            let res = CreatedResponse {
                message: format!("{} created successfully", def.label),
                inserted_id: id.to_hex(),
            };
            Ok((StatusCode::CREATED, Json(res)).into_response())
        }
        (PayloadShape::Single, _) => Err(AppError::invalid_payload("Expected a JSON object")),
    }
}

// PUT and PATCH both merge the supplied fields into the stored document.
pub async fn update_document(
    State(ctx): State<ResourceCtx>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> Result<Json<UpdatedResponse>, AppError> {
    let Value::Object(patch) = body else {
        return Err(AppError::invalid_payload("Expected a JSON object"));
    };

    let outcome = ctx
        .repo
        .update_by_id(id, patch)
        .await
        .map_err(|e| map_repo_error(&ctx, e))?;

    if !outcome.matched {
        return Err(AppError::not_found(ctx.def.label));
    }

    Ok(Json(UpdatedResponse {
        message: format!("{} updated successfully", ctx.def.label),
        matched_count: 1,
        modified_count: u64::from(outcome.modified),
    }))
}

pub async fn delete_document(
    State(ctx): State<ResourceCtx>,
    PathId(id): PathId,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = ctx
        .repo
        .delete_by_id(id)
        .await
        .map_err(|e| map_repo_error(&ctx, e))?;

    if !deleted {
        return Err(AppError::not_found(ctx.def.label));
    }

    tracing::info!(collection = ctx.def.collection, %id, "document deleted");

    Ok(Json(DeletedResponse {
        message: format!("{} successfully deleted", ctx.def.label),
        deleted,
    }))
}
