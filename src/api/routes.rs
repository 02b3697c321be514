/*
 * Responsibility
 * - URL 構造を定義
 * - CATALOG の resource ごとに同じ verb set を生やす
 *   - GET/POST /{resource}, GET/PUT/PATCH/DELETE /{resource}/{id}
 *   - counter を持つ resource だけ POST /{resource}/{id}/purchase
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    health::{banner, health},
    purchase::record_purchase,
    resources::{
        create_document, delete_document, get_document, list_documents, update_document,
    },
};
use crate::api::resources::{CATALOG, ResourceCtx};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let mut router = Router::new()
        .route("/", get(banner))
        .route("/health", get(health));

    for def in CATALOG {
        let ctx = ResourceCtx::new(def, state.repo(def.collection));
        router = router.merge(resource_routes(ctx));
    }

    router
}

fn resource_routes(ctx: ResourceCtx) -> Router<AppState> {
    let base = format!("/{}", ctx.def.path);
    let item = format!("/{}/{{id}}", ctx.def.path);

    let mut router: Router<ResourceCtx> = Router::new()
        .route(&base, get(list_documents).post(create_document))
        .route(
            &item,
            get(get_document)
                .put(update_document)
                .patch(update_document)
                .delete(delete_document),
        );

    if ctx.def.counter_field.is_some() {
        router = router.route(&format!("{item}/purchase"), post(record_purchase));
    }

    router.with_state(ctx)
}
