//! Mapping of core errors to HTTP responses

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Map, Value};
use tracing::error;

use zidian_core::{Error, ValidationError};

/// Error returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),
    /// Runtime failure outside the core (e.g. a panicked blocking task)
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Core(Error::Validation(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::single("body", rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ValidationError::single("id", rejection.body_text()).into()
    }
}

/// `{field: [messages]}` in first-seen field order
fn grouped_errors(err: &ValidationError) -> Value {
    let mut grouped = Map::new();
    for e in &err.errors {
        let messages = grouped
            .entry(e.field.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = messages {
            list.push(Value::String(e.message.clone()));
        }
    }
    Value::Object(grouped)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Core(Error::Validation(err)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "message": err.to_string(),
                    "errors": grouped_errors(err),
                }),
            ),
            ApiError::Core(err @ Error::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, json!({ "message": err.to_string() }))
            }
            ApiError::Core(err @ Error::Conflict { actual, .. }) => (
                StatusCode::CONFLICT,
                json!({ "message": err.to_string(), "version": actual }),
            ),
            ApiError::Core(err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
            ApiError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
