use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::EntityId;
use super::repository::RepositoryError;

/// Error raised by the assessment components.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },
    #[error("entity '{entity_id}' is disabled for scoring")]
    InactiveEntity { entity_id: EntityId },
    #[error("invalid score for criterion '{criterion}': {reason}")]
    InvalidScore { criterion: String, reason: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AssessmentError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code carried in every error payload.
    pub const fn code(&self) -> &'static str {
        match self {
            AssessmentError::NotFound { .. } => "not_found",
            AssessmentError::InactiveEntity { .. } => "inactive_entity",
            AssessmentError::InvalidScore { .. } => "invalid_score",
            AssessmentError::Validation(_) => "validation_error",
            AssessmentError::Repository(RepositoryError::Conflict) => "conflict",
            AssessmentError::Repository(RepositoryError::NotFound) => "not_found",
            AssessmentError::Repository(RepositoryError::Unavailable(_)) => "store_unavailable",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            AssessmentError::NotFound { .. } => StatusCode::NOT_FOUND,
            AssessmentError::InactiveEntity { .. } => StatusCode::CONFLICT,
            AssessmentError::InvalidScore { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AssessmentError::Validation(_) => StatusCode::BAD_REQUEST,
            AssessmentError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AssessmentError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AssessmentError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for AssessmentError {
    fn into_response(self) -> Response {
        let status = self.status();
        let payload = match &self {
            AssessmentError::InvalidScore { criterion, .. } => json!({
                "error": self.to_string(),
                "code": self.code(),
                "criterion": criterion,
            }),
            _ => json!({
                "error": self.to_string(),
                "code": self.code(),
            }),
        };
        (status, Json(payload)).into_response()
    }
}
