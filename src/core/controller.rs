use std::sync::Arc;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use crate::catalog::domain::CatalogService;
use crate::core::command::CommandError;
use crate::core::domain::Configuration;

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Clone)]
pub struct AppState {
    pub config: Configuration,
    pub catalog: Arc<dyn CatalogService>,
}

impl AppState {
    pub fn new(config: Configuration, catalog: Arc<dyn CatalogService>) -> AppState {
        AppState {
            config,
            catalog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    List(Vec<String>),
}

// ServerError is the only error shape written to clients:
// {"error": {"message": ..., "status": ...}}
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    pub status: StatusCode,
    pub message: ErrorMessage,
}

impl ServerError {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self { status, message: ErrorMessage::Text(message.to_string()) }
    }

    pub fn with_list(status: StatusCode, messages: Vec<String>) -> Self {
        Self { status, message: ErrorMessage::List(messages) }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn json_to_server_error(err: JsonRejection) -> ServerError {
    ServerError::new(StatusCode::BAD_REQUEST, err.body_text().as_str())
}

pub fn query_to_server_error(err: QueryRejection) -> ServerError {
    ServerError::new(StatusCode::BAD_REQUEST, err.body_text().as_str())
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Validation { messages } => {
                ServerError::with_list(StatusCode::BAD_REQUEST, messages)
            }
            CommandError::MalformedRequest { message } => {
                ServerError::new(StatusCode::BAD_REQUEST, message.as_str())
            }
            CommandError::NotFound { message } => {
                ServerError::new(StatusCode::NOT_FOUND, message.as_str())
            }
            CommandError::DuplicateKey { message } => {
                ServerError::new(StatusCode::CONFLICT, message.as_str())
            }
            CommandError::Database { .. } | CommandError::Runtime { .. } |
            CommandError::Serialization { .. } => {
                tracing::error!(
                    retryable = err.retryable(),
                    reason_code = err.reason_code().unwrap_or("none"),
                    error = ?err,
                    "request failed");
                ServerError::internal()
            }
        }
    }
}

pub(crate) async fn not_found() -> ServerError {
    ServerError::new(StatusCode::NOT_FOUND, "Not Found")
}
