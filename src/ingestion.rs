//! Ingestion contract: send a PDF to the engine and read back what it ingested.
//!
//! The engine owns page-range policy. A lone `start_page` or `end_page` is forwarded
//! as-is and the effective range comes back in `ingested_range`.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::domain::IngestionResult;
use crate::engine::{failure_body, EngineClient, UPLOAD_PATH};
use crate::error::{IngestionError, ValidationError};

/// A pending upload as chosen by the user.
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
  pub filename: String,
  pub bytes: Vec<u8>,
  pub start_page: Option<u32>,
  pub end_page: Option<u32>,
}

#[derive(Serialize)]
struct UploadQuery {
  #[serde(skip_serializing_if = "Option::is_none")]
  start_page: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  end_page: Option<u32>,
}

impl UploadForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.bytes.is_empty() || self.filename.trim().is_empty() {
      return Err(ValidationError::MissingFile);
    }
    if !self.filename.to_ascii_lowercase().ends_with(".pdf") {
      return Err(ValidationError::NotPdf(self.filename.clone()));
    }
    if self.start_page == Some(0) || self.end_page == Some(0) {
      return Err(ValidationError::ZeroPage);
    }
    if let (Some(start), Some(end)) = (self.start_page, self.end_page) {
      if start > end {
        return Err(ValidationError::InvertedRange { start, end });
      }
    }
    Ok(())
  }
}

/// `POST /api/pdf/upload` with the file as multipart field `file`.
/// Callers must have run `UploadForm::validate`; the workflow controller does.
#[instrument(
  level = "info",
  target = "engine",
  skip(engine, form),
  fields(filename = %form.filename, size = form.bytes.len(), start = ?form.start_page, end = ?form.end_page)
)]
pub async fn submit_upload(engine: &EngineClient, form: &UploadForm) -> Result<IngestionResult, IngestionError> {
  let part = Part::bytes(form.bytes.clone())
    .file_name(form.filename.clone())
    .mime_str("application/pdf")
    .map_err(|e| IngestionError::Transport(e.to_string()))?;
  let query = UploadQuery { start_page: form.start_page, end_page: form.end_page };

  let start = std::time::Instant::now();
  let res = engine.client.post(engine.url(UPLOAD_PATH))
    .query(&query)
    .multipart(Form::new().part("file", part))
    .send().await
    .map_err(|e| IngestionError::Transport(e.to_string()))?;

  if !res.status().is_success() {
    let (status, body) = failure_body(res, "Upload failed. Please try again.").await;
    error!(target: "engine", status, elapsed = ?start.elapsed(), "Ingestion rejected");
    return Err(IngestionError::Rejected { status, body });
  }

  let result: IngestionResult = res.json().await.map_err(|e| IngestionError::Decode(e.to_string()))?;
  info!(
    target: "engine",
    pdf_id = %result.pdf_id,
    total_pages = ?result.total_pages,
    chunks = result.chunks_created,
    range = ?result.ingested_range,
    elapsed = ?start.elapsed(),
    "PDF ingested"
  );
  Ok(result)
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use axum::body::Bytes;
  use axum::extract::Query;
  use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
  use axum::response::IntoResponse;
  use axum::routing::post;
  use axum::{Json, Router};
  use serde_json::json;

  use super::*;
  use crate::domain::PageRange;
  use crate::engine::mock;

  fn form(start: Option<u32>, end: Option<u32>) -> UploadForm {
    UploadForm { filename: "book.pdf".into(), bytes: b"%PDF-1.7 fake".to_vec(), start_page: start, end_page: end }
  }

  /// Echoes the forwarded bounds back as the ingested range, clamped to 30 pages.
  async fn echo_upload(Query(q): Query<HashMap<String, String>>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let multipart = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    let text = String::from_utf8_lossy(&body);
    if !multipart.starts_with("multipart/form-data") || !text.contains("name=\"file\"") || !text.contains("filename=\"book.pdf\"") {
      return (StatusCode::BAD_REQUEST, "missing file part".to_string()).into_response();
    }
    let start: u32 = q.get("start_page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let end: u32 = q.get("end_page").and_then(|v| v.parse().ok()).unwrap_or(30);
    Json(json!({
      "pdf_id": "pdf-1",
      "filename": "book.pdf",
      "total_pages": 30,
      "chunks_created": 12,
      "ingested_range": {"start_page": start, "end_page": end},
      "forwarded": q.keys().cloned().collect::<Vec<_>>(),
    })).into_response()
  }

  #[test]
  fn validation_rejects_missing_or_bad_input() {
    assert_eq!(UploadForm::default().validate(), Err(ValidationError::MissingFile));
    let mut f = form(None, None);
    f.filename = "notes.docx".into();
    assert!(matches!(f.validate(), Err(ValidationError::NotPdf(_))));
    assert_eq!(form(Some(0), None).validate(), Err(ValidationError::ZeroPage));
    assert_eq!(form(Some(9), Some(3)).validate(), Err(ValidationError::InvertedRange { start: 9, end: 3 }));
    assert!(form(Some(3), None).validate().is_ok());
  }

  #[tokio::test]
  async fn upload_forwards_bounds_and_parses_result() {
    let engine = mock::spawn(Router::new().route(UPLOAD_PATH, post(echo_upload))).await;
    let r = submit_upload(&engine, &form(Some(5), Some(20))).await.unwrap();
    assert_eq!(r.pdf_id, "pdf-1");
    assert_eq!(r.total_pages, Some(30));
    assert_eq!(r.ingested_range, Some(PageRange { start_page: 5, end_page: 20 }));
  }

  #[tokio::test]
  async fn lone_bound_is_forwarded_alone() {
    let engine = mock::spawn(Router::new().route(UPLOAD_PATH, post(echo_upload))).await;
    let r = submit_upload(&engine, &form(None, Some(12))).await.unwrap();
    assert_eq!(r.ingested_range, Some(PageRange { start_page: 1, end_page: 12 }));
  }

  #[tokio::test]
  async fn non_success_carries_body_text() {
    let app = Router::new().route(
      UPLOAD_PATH,
      post(|| async { (StatusCode::BAD_REQUEST, "Unable to extract text from PDF.") }),
    );
    let engine = mock::spawn(app).await;
    let err = submit_upload(&engine, &form(None, None)).await.unwrap_err();
    assert!(matches!(err, IngestionError::Rejected { status: 400, .. }));
    assert_eq!(err.to_string(), "Unable to extract text from PDF.");
  }
}
