use std::any::Any;

use axum::body::Body;
use axum::extract::path::ErrorKind;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::Request;
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;
use crate::validation::ValidationErrors;

const MALFORMED_JSON_MESSAGE: &str = "Request body contains invalid JSON or missing required fields";
const SERVICE_ERROR_MESSAGE: &str = "A service error occurred while processing your request";
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Uniform error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: error.to_string(),
            message: message.into(),
            path: String::new(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::InvalidParameter(_)
            | AppError::MalformedJson(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let status = self.status();
        match self {
            AppError::NotFound(msg) => ErrorResponse::new(status, "Account Not Found", msg.clone()),
            AppError::Validation(errors) => {
                ErrorResponse::new(status, "Validation Failed", errors.to_string())
            }
            AppError::InvalidParameter(msg) => {
                ErrorResponse::new(status, "Invalid Parameter", msg.clone())
            }
            AppError::MalformedJson(_) => {
                ErrorResponse::new(status, "Malformed JSON", MALFORMED_JSON_MESSAGE)
            }
            AppError::InvalidRequest(msg) => {
                ErrorResponse::new(status, "Invalid Request", msg.clone())
            }
            AppError::Store(_) => ErrorResponse::new(status, "Service Error", SERVICE_ERROR_MESSAGE),
            AppError::Internal(_) => {
                ErrorResponse::new(status, "Internal Server Error", INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(_) | AppError::Internal(_) => error!("Request failed: {}", self),
            _ => warn!("Request rejected: {}", self),
        }
        let body = self.to_error_response();
        let mut response = (self.status(), Json(body.clone())).into_response();
        // picked up by `attach_error_path` once the request path is known
        response.extensions_mut().insert(body);
        response
    }
}

/// Middleware that stamps the request path into error bodies.
pub async fn attach_error_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    if let Some(mut body) = response.extensions_mut().remove::<ErrorResponse>() {
        body.path = path;
        match serde_json::to_vec(&body) {
            Ok(bytes) => {
                response.headers_mut().remove(CONTENT_LENGTH);
                *response.body_mut() = Body::from(bytes);
            }
            Err(e) => error!("Failed to serialize error body: {}", e),
        }
    }
    response
}

/// Converts a handler panic into the uniform 500 body.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedJson(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let message = match &rejection {
            PathRejection::FailedToDeserializePathParams(inner) => match inner.kind() {
                ErrorKind::ParseErrorAtKey { key, value, expected_type } => format!(
                    "Invalid value '{}' for parameter '{}'. Expected type: {}",
                    value, key, expected_type
                ),
                _ => inner.body_text(),
            },
            other => other.body_text(),
        };
        AppError::InvalidParameter(message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParameter(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::NotFound("Account not found with ID: x".to_string());
        let body = err.to_error_response();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(body.status, 404);
        assert_eq!(body.error, "Account Not Found");
        assert_eq!(body.message, "Account not found with ID: x");
    }

    #[test]
    fn test_malformed_json_hides_parser_detail() {
        let err = AppError::MalformedJson("expected value at line 1 column 2".to_string());
        let body = err.to_error_response();
        assert_eq!(body.status, 400);
        assert_eq!(body.error, "Malformed JSON");
        assert_eq!(body.message, MALFORMED_JSON_MESSAGE);
    }

    #[test]
    fn test_store_failure_does_not_leak_details() {
        let err = AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let body = err.to_error_response();
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "Service Error");
        assert!(!body.message.contains("pool"));
    }

    #[test]
    fn test_internal_failure_is_generic() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        let body = err.to_error_response();
        assert_eq!(body.status, 500);
        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_client_errors_are_400() {
        for err in [
            AppError::InvalidParameter("bad".into()),
            AppError::InvalidRequest("bad".into()),
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            AppError::InvalidRequest("userId must not be blank".into())
                .to_error_response()
                .error,
            "Invalid Request"
        );
    }

    #[test]
    fn test_error_response_carries_extension() {
        let response = AppError::NotFound("gone".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.extensions().get::<ErrorResponse>().unwrap();
        assert_eq!(body.error, "Account Not Found");
        assert!(body.path.is_empty());
    }
}
