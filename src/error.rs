use reqwest::StatusCode;

use crate::api::envelope::ApiErrorBody;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("HTTP {status}: {body}")]
    Api { status: StatusCode, body: ApiErrorBody },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
}

impl ClientError {
    /// HTTP status of a failed API call, if the failure came from the server.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Per-field validation messages, either raised locally or returned by the server.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation(fields) => Some(fields),
            ClientError::Api { body, .. } if !body.fields.is_empty() => Some(&body.fields),
            _ => None,
        }
    }

    /// The single line shown to a user when an action fails.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotAuthenticated => "User not authenticated".to_string(),
            ClientError::Api { status, body } => body
                .summary()
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
            ClientError::Transport(e) if e.is_timeout() => "Request timed out".to_string(),
            ClientError::Transport(_) => "Network error".to_string(),
            ClientError::Validation(fields) => fields
                .first()
                .map(|(field, message)| format!("{}: {}", field, message))
                .unwrap_or_else(|| "Invalid input".to_string()),
            ClientError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Local session storage is unavailable".to_string()
            }
            ClientError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                "Local session storage is unavailable".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
