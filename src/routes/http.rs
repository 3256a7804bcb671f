//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Validation failures become 409/422 responses; remote failures are reported
//! inside the returned workflow view as the stage's `error`.

use std::sync::Arc;
use axum::{
  extract::State,
  http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic::{current_view, export, run_generation, run_upload};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "debug", skip(state))]
pub async fn http_get_workflow(State(state): State<Arc<AppState>>) -> Json<WorkflowView> {
  Json(current_view(&state).await)
}

#[instrument(level = "info", skip(state, body), fields(filename = %body.filename, b64_len = body.file_base64.len()))]
pub async fn http_post_upload(
  State(state): State<Arc<AppState>>,
  Json(body): Json<UploadIn>,
) -> Result<Json<WorkflowView>, ApiError> {
  let form = body.into_form()?;
  let (completion, view) = run_upload(&state, form).await?;
  info!(target: "mcq_workflow", ?completion, pdf_id = ?view.ingestion.as_ref().map(|r| &r.pdf_id), "HTTP upload handled");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(n = ?body.num_questions, difficulty = ?body.difficulty))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> Result<Json<WorkflowView>, ApiError> {
  let params = body.to_params()?;
  let (completion, view) = run_generation(&state, params).await?;
  info!(target: "mcq_workflow", ?completion, mcqs = view.mcqs.len(), "HTTP generate handled");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_export(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
  let art = export(&state).await?;
  info!(target: "mcq_workflow", filename = %art.filename, bytes = art.bytes.len(), "HTTP export served");
  let disposition = format!("attachment; filename=\"{}\"", art.filename);
  Ok(([(CONTENT_TYPE, "application/json".to_string()), (CONTENT_DISPOSITION, disposition)], art.bytes))
}

#[cfg(test)]
mod tests {
  use axum::body::{to_bytes, Body};
  use axum::http::{Request, StatusCode};
  use axum::routing::post;
  use axum::Router;
  use base64::engine::general_purpose::STANDARD as BASE64;
  use base64::Engine as _;
  use serde_json::{json, Value};
  use tower::ServiceExt;

  use super::*;
  use crate::config::Config;
  use crate::domain::fixtures::mcq;
  use crate::domain::Mcq;
  use crate::engine::{mock, EngineClient, GENERATE_PATH, UPLOAD_PATH};
  use crate::routes::build_router;

  fn offline_state() -> Arc<AppState> {
    let cfg = Config::default();
    let engine = EngineClient::from_config(&cfg).unwrap();
    Arc::new(AppState::with_engine(cfg, engine))
  }

  async fn engine_backed_state() -> Arc<AppState> {
    let app = Router::new()
      .route(UPLOAD_PATH, post(|| async {
        Json(json!({"pdf_id": "p1", "filename": "book.pdf", "total_pages": 50, "chunks_created": 4}))
      }))
      .route(GENERATE_PATH, post(|| async {
        let mcqs: Vec<Mcq> = vec![mcq(1), mcq(2)];
        Json(json!({"total_generated": 2, "mcqs": mcqs}))
      }));
    let engine = mock::spawn(app).await;
    Arc::new(AppState::with_engine(Config::default(), engine))
  }

  async fn call(state: &Arc<AppState>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, Option<String>) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(CONTENT_TYPE, "application/json")
      .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
      .unwrap();
    let res = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let disposition = res.headers().get(CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()).map(str::to_string);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec(), disposition)
  }

  fn upload_body(name: &str) -> Value {
    json!({"filename": name, "fileBase64": BASE64.encode(b"%PDF-1.7")})
  }

  #[tokio::test]
  async fn health_and_idle_view() {
    let state = offline_state();
    let (status, body, _) = call(&state, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"ok": true}));

    let (_, body, _) = call(&state, "GET", "/api/v1/workflow", None).await;
    let view: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(view["stage"], "idle");
    assert_eq!(view["canGenerate"], false);
  }

  #[tokio::test]
  async fn generate_and_export_are_not_ready_before_upload() {
    let state = offline_state();
    let (status, body, _) = call(&state, "POST", "/api/v1/generate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(err["error"]["code"], "NOT_READY");

    let (status, _, _) = call(&state, "GET", "/api/v1/export", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn bad_upload_input_is_rejected_before_dispatch() {
    let state = offline_state();
    let (status, _, _) = call(&state, "POST", "/api/v1/upload", Some(upload_body("notes.docx"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let bad = json!({"filename": "a.pdf", "fileBase64": "!!"});
    let (status, _, _) = call(&state, "POST", "/api/v1/upload", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!state.controller.read().await.upload_in_flight());
  }

  #[tokio::test]
  async fn out_of_range_question_count_is_unprocessable() {
    let state = engine_backed_state().await;
    call(&state, "POST", "/api/v1/upload", Some(upload_body("book.pdf"))).await;
    let (status, _, _) = call(&state, "POST", "/api/v1/generate", Some(json!({"numQuestions": 21}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn full_flow_serves_named_export() {
    let state = engine_backed_state().await;
    let (status, body, _) = call(&state, "POST", "/api/v1/upload", Some(upload_body("book.pdf"))).await;
    assert_eq!(status, StatusCode::OK);
    let view: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(view["pageDefaults"], json!({"startPage": 1, "endPage": 50}));

    let (status, body, _) = call(&state, "POST", "/api/v1/generate", Some(json!({"numQuestions": 2, "difficulty": "hard"}))).await;
    assert_eq!(status, StatusCode::OK);
    let view: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(view["stage"], "reviewed");
    assert_eq!(view["exportFilename"], "mcqs_p1.json");

    let (status, body, disposition) = call(&state, "GET", "/api/v1/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(disposition.as_deref(), Some("attachment; filename=\"mcqs_p1.json\""));
    let arr: Vec<Mcq> = serde_json::from_slice(&body).unwrap();
    assert_eq!(arr, vec![mcq(1), mcq(2)]);
  }
}
