use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{customers::validation::ValidationError, db::StoreError, response::Outcome};

/// Terminal failure of a request, whichever transport carried it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Email already registered")]
    Conflict,

    #[error("User not found")]
    UserNotFound,

    #[error("Endpoint not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `context` is the only part shown to clients outside debug mode.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Store details only leak in debug mode.
    pub fn public_message(&self, debug: bool) -> String {
        match self {
            AppError::Store { context, .. } if !debug => (*context).to_string(),
            other => other.to_string(),
        }
    }

    /// Logs store failures in full and converts to `{error}`.
    pub fn into_outcome(self, debug: bool) -> Outcome {
        if let AppError::Store { context, source } = &self {
            error!(error = %source, context = %context, "store failure");
        }
        Outcome::new(self.status(), json!({ "error": self.public_message(debug) }))
    }
}
