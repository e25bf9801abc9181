/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (PgPool, TokenCodec, OwnerLookup) → Router 組み立て
 * - Middleware の適用 (identity → guards は routes 側, http/cors/security はここ)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{AppEnv, Config, redact_database_url},
    middleware,
    services::{auth::TokenCodec, ownership::PgTodoOwners},
    state::AppState,
};

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,toodoo=debug,tower_http=debug
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

        // development: crash loudly. otherwise keep serving other requests.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(config.app_env == AppEnv::Development);

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        database = %redact_database_url(&config.database_url),
        "starting toodoo API"
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let tokens = Arc::new(TokenCodec::new(&config.secret_key)?);
    let todo_owners = Arc::new(PgTodoOwners::new(db.clone()));

    Ok(AppState::new(db, tokens, todo_owners))
}

/// Full application router with every HTTP layer applied.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = router(state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

/// API routes with identity extraction and guards, without the outer HTTP layers.
pub fn router(state: AppState) -> Router {
    let v1 = middleware::auth::identity::apply(api::v1::routes(&state), state.clone());

    Router::new().nest("/api/v1", v1).with_state(state)
}
