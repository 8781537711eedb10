//! Response envelopes and error mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::SyncError;
use crate::sync::{ReportStatus, SyncReport, ValidationReport};

pub type ApiResult<T> = Result<T, ApiError>;

/// `{success: true, ...payload}`.
#[derive(Serialize)]
pub struct ApiSuccess<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

pub fn ok<T: Serialize>(payload: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess {
        success: true,
        payload,
    })
}

/// An error answered as `{success: false, error, ...details}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let status = match &err {
            SyncError::InvalidIdentifier(_) | SyncError::InvalidModel(_) => StatusCode::BAD_REQUEST,
            SyncError::NotFound(_) => StatusCode::NOT_FOUND,
            SyncError::Busy(_) => StatusCode::CONFLICT,
            SyncError::ConfigurationMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SyncError::Upstream(_) => StatusCode::BAD_GATEWAY,
            SyncError::PartialFailure { .. } => StatusCode::MULTI_STATUS,
        };
        let details = match &err {
            SyncError::PartialFailure {
                succeeded, failed, ..
            } => Some(json!({ "partial": true, "succeeded": succeeded, "failed": failed })),
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.message, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), error = %self.message, "request rejected");
        }
        let mut body = json!({ "success": false, "error": self.message });
        if let (Some(Value::Object(extra)), Some(obj)) = (self.details, body.as_object_mut()) {
            obj.extend(extra);
        }
        (self.status, Json(body)).into_response()
    }
}

/// A sync report: 200 when complete, 207 when partial, 502 when every
/// action failed. The full report is included in each case.
pub fn report_response(report: SyncReport, extra: Option<Value>) -> Response {
    let status = match report.status {
        ReportStatus::Complete => StatusCode::OK,
        ReportStatus::Partial => StatusCode::MULTI_STATUS,
        ReportStatus::Failed => StatusCode::BAD_GATEWAY,
    };
    let mut body = envelope(&report, status);
    merge(&mut body, extra);
    (status, Json(body)).into_response()
}

/// Reports of a multi-model sync. The worst status wins.
pub fn reports_response(reports: Vec<SyncReport>) -> Response {
    let status = if reports.iter().all(SyncReport::is_complete) {
        StatusCode::OK
    } else if reports.iter().all(|r| r.status == ReportStatus::Failed) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::MULTI_STATUS
    };
    let body = json!({
        "success": status == StatusCode::OK,
        "partial": status == StatusCode::MULTI_STATUS,
        "message": format!("Synchronized {} models", reports.len()),
        "results": reports,
    });
    (status, Json(body)).into_response()
}

/// 200 when every missing field was added, 207 otherwise.
pub fn validation_response(report: ValidationReport) -> Response {
    let status = if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    (status, Json(envelope(&report, status))).into_response()
}

fn envelope<T: Serialize>(payload: &T, status: StatusCode) -> Value {
    let mut body = json!({
        "success": status == StatusCode::OK,
        "partial": status == StatusCode::MULTI_STATUS,
    });
    merge(&mut body, serde_json::to_value(payload).ok());
    body
}

fn merge(body: &mut Value, extra: Option<Value>) {
    if let (Some(Value::Object(extra)), Some(obj)) = (extra, body.as_object_mut()) {
        obj.extend(extra);
    }
}
