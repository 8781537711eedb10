//! Axum server for the boundary API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::sync_api;
use crate::config::{ServerSettings, Settings};
use crate::metadata::{HasuraClient, MetadataService};
use crate::model::ModelRegistry;
use crate::sync::Reconciler;

/// Application state shared across handlers
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    /// Permits for concurrent GraphQL proxy requests.
    pub graphql_guard: Semaphore,
    /// How long a proxy request waits for a permit.
    pub graphql_wait: Duration,
}

impl AppState {
    pub fn new(reconciler: Arc<Reconciler>, server: &ServerSettings) -> Self {
        Self {
            reconciler,
            graphql_guard: Semaphore::new(server.graphql_concurrency.max(1)),
            graphql_wait: Duration::from_millis(server.graphql_wait_ms),
        }
    }
}

/// Build the axum router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/db/run-sql", post(sync_api::run_sql))
        .route("/api/db/track-table", post(sync_api::track_table))
        .route("/api/db-sync", post(sync_api::sync_models))
        .route("/api/db-sync/tables", get(sync_api::list_tables))
        .route("/api/db-sync/models", get(sync_api::list_models))
        .route(
            "/api/db-sync/get-table-structure",
            get(sync_api::get_table_structure),
        )
        .route(
            "/api/db-sync/validate-structure",
            post(sync_api::validate_structure),
        )
        .route("/api/db-sync/create-model", post(sync_api::create_model))
        .route("/api/db-sync/update-model", post(sync_api::update_model))
        .route("/api/graphql", post(sync_api::graphql))
        .route("/api/service-status", get(sync_api::service_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Wire the Hasura client, the built-in registry and the reconciler.
pub fn build_state(settings: &Settings) -> Result<Arc<AppState>, Box<dyn std::error::Error>> {
    let client = HasuraClient::new(settings.metadata.clone())?;
    let service: Arc<dyn MetadataService> = Arc::new(client);
    let registry = Arc::new(ModelRegistry::with_builtin_models());
    let reconciler = Reconciler::new(
        service,
        registry,
        &settings.sync,
        settings.metadata.schema.clone(),
    );
    Ok(Arc::new(AppState::new(Arc::new(reconciler), &settings.server)))
}

/// Start the web server
pub async fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&settings)?;
    let app = router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, "modelsync API listening");
    if settings.metadata.admin_secret.is_none() {
        tracing::warn!("no admin secret configured; metadata calls will fail");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
