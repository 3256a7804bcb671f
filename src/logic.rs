//! Core behaviors shared by the HTTP handlers and the one-shot CLI run.
//!
//! Each operation is: take the write lock and `begin_*`, release it, await the engine,
//! take the write lock again and `complete_*`. Validation failures come back as `Err`;
//! remote failures are recorded on the controller and show up in the returned view.
//!
//! The engine call and its `complete_*` run in a spawned task. Dropping the caller
//! (a client hanging up mid-request) therefore never strands an in-flight slot: the
//! task still settles it once the engine answers or the request timeout fires.

use tokio::task::JoinError;
use tracing::{debug, error, info, instrument, Instrument};

use crate::error::{ReviewError, ValidationError};
use crate::generation::{submit_generation, GenerationParams};
use crate::ingestion::{submit_upload, UploadForm};
use crate::protocol::{to_view, WorkflowView};
use crate::review::ExportArtifact;
use crate::state::AppState;
use crate::workflow::Completion;

#[instrument(level = "info", skip(state, form), fields(filename = %form.filename, size = form.bytes.len()))]
pub async fn run_upload(state: &AppState, form: UploadForm) -> Result<(Completion, WorkflowView), ValidationError> {
  let ticket = state.controller.write().await.begin_upload(&form)?;

  let controller = state.controller.clone();
  let engine = state.engine.clone();
  let task = tokio::spawn(async move {
    let result = submit_upload(&engine, &form).await;
    let mut ctl = controller.write().await;
    let completion = ctl.complete_upload(ticket, result);
    info!(target: "mcq_workflow", ?completion, stage = ?ctl.stage(), "Upload finished");
    (completion, to_view(&ctl))
  }.in_current_span());

  match task.await {
    Ok(done) => Ok(done),
    Err(e) => Ok(join_failed(state, "upload", e).await),
  }
}

#[instrument(level = "info", skip(state), fields(n = params.num_questions, difficulty = %params.difficulty))]
pub async fn run_generation(state: &AppState, params: GenerationParams) -> Result<(Completion, WorkflowView), ValidationError> {
  let (ticket, request) = state.controller.write().await.begin_generation(&params)?;

  let controller = state.controller.clone();
  let engine = state.engine.clone();
  let task = tokio::spawn(async move {
    let result = submit_generation(&engine, &request).await;
    let mut ctl = controller.write().await;
    let completion = ctl.complete_generation(ticket, result);
    if completion == Completion::Discarded {
      debug!(target: "mcq_workflow", issued_for = %request.pdf_id(), "Generation result ignored");
    }
    info!(target: "mcq_workflow", ?completion, stage = ?ctl.stage(), "Generation finished");
    (completion, to_view(&ctl))
  }.in_current_span());

  match task.await {
    Ok(done) => Ok(done),
    Err(e) => Ok(join_failed(state, "generation", e).await),
  }
}

/// A panicking engine task is re-raised; a cancelled one (runtime shutting down)
/// is reported as a failure against whatever the controller holds now.
async fn join_failed(state: &AppState, call: &str, e: JoinError) -> (Completion, WorkflowView) {
  if e.is_panic() {
    std::panic::resume_unwind(e.into_panic());
  }
  error!(target: "mcq_workflow", call, error = %e, "Engine task cancelled");
  (Completion::Failed(e.to_string()), to_view(&*state.controller.read().await))
}

pub async fn current_view(state: &AppState) -> WorkflowView {
  to_view(&*state.controller.read().await)
}

pub async fn export(state: &AppState) -> Result<ExportArtifact, ReviewError> {
  state.controller.read().await.export()
}
