/*
 * Responsibility
 * - Config読み込み → 依存生成 (DocumentStore) → Router 組み立て
 * - Middleware の適用 (CORS / request-id / timeout / trace)
 * - axum::serve() で起動
 */
use anyhow::{Context, Result};
use axum::Router;
use std::{panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api::{self, resources::CATALOG},
    config::{Config, StoreConfig},
    middleware,
    services::store::{DocumentStore, MemoryStore, MongoStore},
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,aiverse_backend=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!("listening on {}", config.addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    tracing::info!(store = %config.store.describe(), "connecting to document store");

    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreConfig::Mongo { uri, db } => Arc::new(
            MongoStore::connect(uri, db)
                .await
                .context("failed to connect to MongoDB")?,
        ),
        StoreConfig::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(backend = store.backend_name(), "document store ready");

    let state = AppState::new(store);
    prepare_collections(&state).await?;

    Ok(state)
}

/// Register the unique keys behind every resource's duplicate guard.
pub async fn prepare_collections(state: &AppState) -> Result<()> {
    for def in CATALOG {
        let Some(guard) = &def.duplicate_guard else {
            continue;
        };

        state
            .store
            .ensure_unique(def.collection, guard.fields)
            .await
            .with_context(|| format!("failed to prepare unique key on {}", def.collection))?;

        tracing::debug!(
            collection = def.collection,
            fields = ?guard.fields,
            "unique key ensured"
        );
    }
    Ok(())
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(&state).with_state(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
