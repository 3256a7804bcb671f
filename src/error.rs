//! Error taxonomy for the workflow.
//!
//! - `ValidationError`: a precondition failed before any network call.
//! - `IngestionError` / `GenerationError`: the remote call failed; `Rejected` carries
//!   the engine's response body verbatim so it can be shown as-is.
//! - `StaleResponse`: internal only, a completion that no longer matches current state.
//! - `ApiError`: what the local presentation API turns the above into.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::MAX_QUESTIONS;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a PDF file is required")]
    MissingFile,
    #[error("only .pdf files are supported: {0}")]
    NotPdf(String),
    #[error("no ingested PDF: upload and process a PDF first")]
    MissingPdfId,
    #[error("page numbers start at 1")]
    ZeroPage,
    #[error("start page {start} is after end page {end}")]
    InvertedRange { start: u32, end: u32 },
    #[error("end page unknown: the engine did not report a page count, pass it explicitly")]
    UnknownEndPage,
    #[error("number of questions must be between 1 and {max}, got {0}", max = MAX_QUESTIONS)]
    QuestionCount(u32),
    #[error("difficulty must be one of easy, medium, hard: {0:?}")]
    InvalidDifficulty(String),
    #[error("an upload is already in progress")]
    UploadInFlight,
    #[error("a generation is already in progress")]
    GenerationInFlight,
}

#[derive(Debug, Error)]
pub enum IngestionError {
    /// Non-success status; the body text is the user-facing message.
    #[error("{body}")]
    Rejected { status: u16, body: String },
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("could not read ingestion response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{body}")]
    Rejected { status: u16, body: String },
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("could not read generation response: {0}")]
    Decode(String),
    #[error("engine returned an invalid question: {0}")]
    InvalidMcq(String),
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("nothing to export yet: generate MCQs first")]
    NothingToExport,
    #[error("could not serialize review set: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A completion whose originating request no longer matches the controller's state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("stale {kind} response for {issued_for:?} (active: {active:?})")]
pub struct StaleResponse {
    pub kind: &'static str,
    pub issued_for: Option<String>,
    pub active: Option<String>,
}

/// Errors returned by the local presentation API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Review(#[from] ReviewError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(
                ValidationError::UploadInFlight
                | ValidationError::GenerationInFlight
                | ValidationError::MissingPdfId,
            ) => (StatusCode::CONFLICT, "NOT_READY"),
            ApiError::Review(ReviewError::NothingToExport) => (StatusCode::CONFLICT, "NOT_READY"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Review(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}
