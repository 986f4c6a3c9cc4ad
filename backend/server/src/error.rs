use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::error::{ErrorKind, WriteFailure};
use query::QueryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::{state::AppState, store::Store};

const INTERNAL_ERROR: &str = "Internal server error";
const DUPLICATE_KEY: i32 = 11000;
const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Query(QueryError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Store(source) => match source.downcast::<mongodb::error::Error>() {
                Ok(database) => Self::Database(*database),
                Err(other) => Self::Query(QueryError::Store(other)),
            },
            err => Self::Query(err),
        }
    }
}

/// JSON envelope of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Full error text attached to 5xx responses, surfaced by [`expose_error_details`].
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    message: String,
    debug: String,
}

impl AppError {
    fn classify(&self) -> (StatusCode, String) {
        match self {
            Self::MalformedPayload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Query(err) => {
                let status = match err {
                    QueryError::NotFound(_) => StatusCode::NOT_FOUND,
                    QueryError::IncompleteData(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    QueryError::Store(_) => {
                        return (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string());
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            Self::Database(err) => match err.kind.as_ref() {
                ErrorKind::InvalidArgument { .. } => {
                    (StatusCode::BAD_REQUEST, "Invalid value in query".to_string())
                }
                _ => match server_code(err) {
                    Some(DUPLICATE_KEY) => {
                        (StatusCode::CONFLICT, "Duplicate field value".to_string())
                    }
                    Some(DOCUMENT_VALIDATION_FAILURE) => {
                        (StatusCode::BAD_REQUEST, "Document failed validation".to_string())
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string()),
                },
            },
        }
    }
}

fn server_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.classify();

        let mut response = (
            status,
            Json(ErrorBody {
                error: message,
                details: None,
            }),
        )
            .into_response();

        if status.is_server_error() {
            error!("Request failed: {self}");

            response.extensions_mut().insert(ErrorDetails {
                message: self.to_string(),
                debug: format!("{self:?}"),
            });
        }

        response
    }
}

/// Outside production, rewrites 5xx bodies to carry the underlying error.
pub async fn expose_error_details<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    mut response: Response,
) -> Response {
    let Some(details) = response.extensions_mut().remove::<ErrorDetails>() else {
        return response;
    };

    if state.config.production {
        return response;
    }

    (
        response.status(),
        Json(ErrorBody {
            error: details.message,
            details: Some(Value::String(details.debug)),
        }),
    )
        .into_response()
}

/// Failures that stop the server from starting.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
