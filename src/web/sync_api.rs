//! Handlers for the schema sync, SQL, tracking and GraphQL routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::SemaphorePermit;

use super::extract::ApiJson;
use super::response::{ok, report_response, reports_response, validation_response, ApiError, ApiResult};
use super::server::AppState;
use crate::metadata::{GraphqlRequest, MetadataError};
use crate::sync::{ActionKind, CreateModelRequest, UpdateModelRequest};

#[derive(Deserialize)]
pub struct RunSqlRequest {
    sql: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRequest {
    #[serde(alias = "table")]
    table_name: String,
}

#[derive(Deserialize)]
pub struct TableQuery {
    table: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    model_name: Option<String>,
}

/// POST /api/db/run-sql
pub async fn run_sql(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RunSqlRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.sql.trim().is_empty() {
        return Err(ApiError::bad_request("sql is required"));
    }
    let result = state.reconciler.run_sql(&req.sql).await?;
    Ok(ok(json!({ "result": result })))
}

/// POST /api/db/track-table
pub async fn track_table(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TableRequest>,
) -> ApiResult<Response> {
    let report = state.reconciler.track_table(&req.table_name).await?;
    let tracked = report
        .actions
        .iter()
        .any(|a| a.action == ActionKind::TrackTable && a.succeeded);
    Ok(report_response(report, Some(json!({ "tracked": tracked }))))
}

/// GET /api/db-sync/tables
pub async fn list_tables(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let tables = state.reconciler.list_tables().await?;
    Ok(ok(json!({ "tables": tables })))
}

/// GET /api/db-sync/models
pub async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let models = state.reconciler.model_statuses().await?;
    Ok(ok(json!({ "models": models })))
}

/// GET /api/db-sync/get-table-structure?table=
pub async fn get_table_structure(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> ApiResult<impl IntoResponse> {
    let table = query
        .table
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("table is required"))?;
    let columns = state.reconciler.get_table_structure(&table).await?;
    Ok(ok(json!({ "columns": columns })))
}

/// POST /api/db-sync/validate-structure
pub async fn validate_structure(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TableRequest>,
) -> ApiResult<Response> {
    let report = state.reconciler.validate_structure(&req.table_name).await?;
    Ok(validation_response(report))
}

/// POST /api/db-sync/create-model
pub async fn create_model(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateModelRequest>,
) -> ApiResult<Response> {
    let report = state.reconciler.create_model(req).await?;
    let sql = report.create_sql().map(str::to_string);
    Ok(report_response(report, Some(json!({ "sql": sql }))))
}

/// POST /api/db-sync/update-model
pub async fn update_model(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<UpdateModelRequest>,
) -> ApiResult<Response> {
    let report = state.reconciler.update_model(req).await?;
    Ok(report_response(report, None))
}

/// POST /api/db-sync - one model when `modelName` is given, all otherwise.
pub async fn sync_models(
    State(state): State<Arc<AppState>>,
    body: Option<ApiJson<SyncRequest>>,
) -> ApiResult<Response> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    match req.model_name.filter(|m| !m.is_empty()) {
        Some(name) => {
            let report = state.reconciler.sync_model(&name).await?;
            Ok(report_response(report, None))
        }
        None => {
            let reports = state.reconciler.sync_all_models().await?;
            Ok(reports_response(reports))
        }
    }
}

/// POST /api/graphql
///
/// At most `graphql_concurrency` requests are forwarded at once. GraphQL
/// errors are passed through with status 200, as the service itself does.
pub async fn graphql(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GraphqlRequest>,
) -> Response {
    let Some(_permit) = acquire_graphql_permit(&state).await else {
        tracing::warn!("graphql proxy saturated");
        return graphql_errors(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many concurrent GraphQL requests, try again shortly",
        );
    };

    match state.reconciler.service().run_graphql(&req).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(MetadataError::GraphQl(message)) => graphql_errors(StatusCode::OK, &message),
        Err(e) => {
            tracing::error!(error = %e, "graphql proxy failed");
            graphql_errors(StatusCode::BAD_GATEWAY, &e.to_string())
        }
    }
}

async fn acquire_graphql_permit(state: &AppState) -> Option<SemaphorePermit<'_>> {
    if state.graphql_wait.is_zero() {
        return state.graphql_guard.try_acquire().ok();
    }
    match tokio::time::timeout(state.graphql_wait, state.graphql_guard.acquire()).await {
        Ok(Ok(permit)) => Some(permit),
        _ => None,
    }
}

fn graphql_errors(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "errors": [{ "message": message }] }))).into_response()
}

/// GET /api/service-status
pub async fn service_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = state.reconciler.service();
    let connected = service.check_connection().await;
    ok(json!({ "connected": connected, "service": service.service_info() }))
}
