//! Error handling for the bookshelf HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Standard error envelope: `{"error": {"message": ..., "status": ...}}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// A single message, or a list of messages for validation failures
    pub message: Value,
    pub status: u16,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {}", .messages.join("; "))]
    Validation { messages: Vec<String> },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Any other status raised by the HTTP plumbing (405, 408, ...)
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error carrying every failed check
    pub fn validation<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an error for `status` using its canonical reason as the message
    pub fn from_status(status: StatusCode) -> Self {
        Self::Status {
            status,
            message: status.canonical_reason().unwrap_or("Error").to_string(),
        }
    }

    /// HTTP status this error renders with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Status { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation([rejection.body_text()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        let mut cause = None;
        let message = match self {
            AppError::Validation { messages } => json!(messages),
            AppError::NotFound { message }
            | AppError::BadRequest { message }
            | AppError::Status { message, .. } => json!(message),
            AppError::Internal(e) => {
                let message = e.to_string();
                cause = Some(format!("{e:?}"));

                // Hide internal details outside of debug builds
                if cfg!(debug_assertions) {
                    json!(message)
                } else {
                    json!("An internal server error occurred")
                }
            }
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = cause.as_deref().unwrap_or_default(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let error_body = ErrorBody {
            message,
            status: status.as_u16(),
        };
        let body = json!({ "error": error_body });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    /// Counts events logged at each of ERROR and WARN
    #[derive(Clone, Default)]
    struct LevelCounter {
        errors: Arc<AtomicUsize>,
        warnings: Arc<AtomicUsize>,
    }

    impl<S: tracing::Subscriber> Layer<S> for LevelCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            match *event.metadata().level() {
                tracing::Level::ERROR => self.errors.fetch_add(1, Ordering::SeqCst),
                tracing::Level::WARN => self.warnings.fetch_add(1, Ordering::SeqCst),
                _ => 0,
            };
        }
    }

    fn render_counting_logs(error: AppError) -> (Response, LevelCounter) {
        let counter = LevelCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let response = tracing::subscriber::with_default(subscriber, || error.into_response());
        (response, counter)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error() {
        let error = AppError::validation(["\"title\" is required", "\"pages\" must be an integer"]);

        match &error {
            AppError::Validation { messages } => assert_eq!(messages.len(), 2),
            _ => panic!("Expected Validation error"),
        }
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_messages() {
        let response = AppError::validation(["\"title\" is required"]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"error": {"message": ["\"title\" is required"], "status": 400}})
        );
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::not_found("Resource not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"error": {"message": "Resource not found", "status": 404}})
        );
    }

    #[test]
    fn test_bad_request_mapping() {
        let response = AppError::bad_request("duplicate").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_error_uses_canonical_reason() {
        let error = AppError::from_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = body_json(error.into_response()).await;
        assert_eq!(
            body,
            json!({"error": {"message": "Method Not Allowed", "status": 405}})
        );
    }

    #[tokio::test]
    async fn test_internal_error_mapping() {
        let internal_error = anyhow::anyhow!("Database connection failed");
        let response = AppError::Internal(internal_error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["status"], 500);
        assert!(body["error"]["message"].is_string());
    }

    #[test]
    fn test_internal_error_is_logged_once() {
        let (response, counter) =
            render_counting_logs(AppError::Internal(anyhow::anyhow!("disk full")));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
        assert_eq!(counter.warnings.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_client_error_is_logged_once_as_warning() {
        let (response, counter) = render_counting_logs(AppError::not_found("no such book"));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(counter.errors.load(Ordering::SeqCst), 0);
        assert_eq!(counter.warnings.load(Ordering::SeqCst), 1);
    }
}
