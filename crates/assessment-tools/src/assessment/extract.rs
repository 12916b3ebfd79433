//! Request extractors whose rejections share the JSON error contract.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use super::error::AssessmentError;

/// JSON body extractor that rejects with [`AssessmentError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AssessmentError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

/// Query string extractor that rejects with [`AssessmentError::Validation`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AssessmentError))]
pub(crate) struct ApiQuery<T>(pub(crate) T);

impl From<JsonRejection> for AssessmentError {
    fn from(rejection: JsonRejection) -> Self {
        AssessmentError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AssessmentError {
    fn from(rejection: QueryRejection) -> Self {
        AssessmentError::Validation(rejection.body_text())
    }
}
