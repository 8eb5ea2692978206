use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::application::ApplicationStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Application not found")]
    ApplicationNotFound,

    #[error("Interview not found")]
    InterviewNotFound,

    #[error("Candidate has already applied to this job posting")]
    DuplicateApplication,

    #[error("Job posting is not active")]
    PostingNotActive,

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Application is in terminal state '{0}' and cannot be modified")]
    TerminalState(ApplicationStatus),

    #[error("Interview does not belong to the given application")]
    InterviewOwnershipMismatch,

    #[error("Application was modified concurrently, expected status '{0}'")]
    StaleStatus(ApplicationStatus),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Rejections the activity log records as denied attempts, as opposed to
    /// infrastructure failures. Not-found lookups are deliberately outside
    /// this set: a denied attempt is a rule violation against an existing
    /// aggregate, while a miss has no resource to log against.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Error::DuplicateApplication
                | Error::PostingNotActive
                | Error::InvalidTransition { .. }
                | Error::TerminalState(_)
                | Error::InterviewOwnershipMismatch
                | Error::StaleStatus(_)
                | Error::BadRequest(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::ApplicationNotFound | Error::InterviewNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::DuplicateApplication
            | Error::InvalidTransition { .. }
            | Error::TerminalState(_)
            | Error::InterviewOwnershipMismatch
            | Error::StaleStatus(_) => (StatusCode::CONFLICT, self.to_string()),
            Error::PostingNotActive => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Error::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::ApplicationNotFound,
            other => Error::Database(other),
        }
    }
}
