use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::constants;

/// Failures while answering a relay request.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{}", constants::NO_MESSAGES)]
    NoMessages,

    #[error("{}", constants::MISSING_API_KEY)]
    MissingApiKey,

    #[error("Invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("OpenAI API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to reach the completion provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Body of every 500 response from the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub fallback: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::NoMessages => {
                (StatusCode::BAD_REQUEST, constants::NO_MESSAGES).into_response()
            }
            other => {
                error!("Relay request failed: {}", other);
                let body = ErrorBody {
                    error: other.to_string(),
                    fallback: constants::RELAY_FALLBACK.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Failures while talking to the relay from the chat client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Relay answered with status {0}")]
    Status(u16),
}

/// Failures reading or writing the saved-chat store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Saved chat storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Saved chat storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No saved chat with id {0}")]
    NotFound(String),
}
