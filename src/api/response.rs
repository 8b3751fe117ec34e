use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::warn;

use crate::error::{AppError, Result};

/// Envelope shared by every endpoint.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: &'static str,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn reply<T>(status: StatusCode, data: Option<T>, message: Option<String>) -> Reply<T> {
    let meta = ResponseMeta {
        status: if status.is_success() { "success" } else { "error" },
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message,
    };
    (status, Json(ApiResponse { data, meta }))
}

pub fn success<T: Serialize>(data: T) -> Reply<T> {
    reply(StatusCode::OK, Some(data), None)
}

pub fn error<T>(status: StatusCode, message: String) -> Reply<T> {
    reply(status, None, Some(message))
}

pub fn from_result<T: Serialize>(result: Result<T>) -> Reply<T> {
    match result {
        Ok(data) => success(data),
        Err(err) => {
            warn!(error = %err, "request failed");
            let status = err.status();
            error(status, message_of(err))
        }
    }
}

fn message_of(err: AppError) -> String {
    match err {
        AppError::FetchError(msg)
        | AppError::LlmError(msg)
        | AppError::ConfigError(msg)
        | AppError::InvalidRequest(msg) => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let (status, Json(body)) = from_result::<()>(Err(AppError::InvalidRequest("bad count".into())));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.data.is_none());
        assert_eq!(body.meta.status, "error");
        assert_eq!(body.meta.status_code, 400);
        assert_eq!(body.meta.message.as_deref(), Some("bad count"));
    }

    #[test]
    fn test_success_envelope() {
        let (status, Json(body)) = success(5);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data, Some(5));
        assert_eq!(body.meta.status, "success");
        assert!(body.meta.message.is_none());
    }
}
