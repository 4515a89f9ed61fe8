pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::db::Database;
use crate::knowledge::handlers as knowledge;
use crate::user_auth::{UserAuthService, handlers as auth, jwt_auth_middleware};
use state::AppState;

/// Assemble every route around `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Auth Routes (public)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/token", post(auth::login));

    // ==========================================================================
    // Knowledge Routes - Protected by bearer token
    // ==========================================================================
    let knowledge_routes = Router::new()
        .route(
            "/knowledge",
            get(knowledge::list_entries).post(knowledge::create_entry),
        )
        .route(
            "/knowledge/{entry_id}",
            get(knowledge::get_entry)
                .put(knowledge::update_entry)
                .delete(knowledge::delete_entry),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes)
        .merge(knowledge_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Connect storage, build services and serve until Ctrl-C.
pub async fn run_server(config: AppConfig) -> Result<()> {
    let db = Database::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    db.init_schema()
        .await
        .context("Failed to initialize schema")?;
    let db = Arc::new(db);

    let user_auth = UserAuthService::from_config(db.pool().clone(), &config.auth)
        .context("Failed to build auth service")?;
    tracing::info!(
        algorithm = %config.auth.algorithm,
        ttl_minutes = user_auth.tokens().ttl().num_minutes(),
        "Token issuer configured"
    );

    let state = Arc::new(AppState::new(db, Arc::new(user_auth)));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.with_context(|| {
        format!(
            "Failed to bind to {} (port {} may already be in use)",
            addr, config.server.port
        )
    })?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
