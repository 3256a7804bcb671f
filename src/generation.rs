//! Generation contract: ask the engine for bilingual MCQs over an ingested page range.
//!
//! A `GenerationRequest` can only be built from an `IngestionResult`, and every
//! precondition is checked at construction. Out-of-range values are rejected here,
//! never clamped, so nothing invalid reaches the network.

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::domain::{check_mcqs, Difficulty, IngestionResult, Mcq, DEFAULT_QUESTIONS, MAX_QUESTIONS};
use crate::engine::{failure_body, EngineClient, GENERATE_PATH};
use crate::error::{GenerationError, ValidationError};

/// User-editable knobs. Page bounds left as `None` take the ingestion defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationParams {
  pub page_start: Option<u32>,
  pub page_end: Option<u32>,
  pub num_questions: u32,
  pub difficulty: Difficulty,
}

impl Default for GenerationParams {
  fn default() -> Self {
    Self { page_start: None, page_end: None, num_questions: DEFAULT_QUESTIONS, difficulty: Difficulty::Medium }
  }
}

/// Wire body for `POST /api/mcq/generate`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GenerationRequest {
  pdf_id: String,
  page_start: u32,
  page_end: u32,
  num_questions: u32,
  difficulty: Difficulty,
}

impl GenerationRequest {
  pub fn from_ingestion(ingestion: &IngestionResult, params: &GenerationParams) -> Result<Self, ValidationError> {
    if ingestion.pdf_id.trim().is_empty() {
      return Err(ValidationError::MissingPdfId);
    }
    let defaults = ingestion.page_defaults();
    let page_start = params.page_start.unwrap_or(defaults.start_page);
    let page_end = params.page_end.or(defaults.end_page).ok_or(ValidationError::UnknownEndPage)?;

    if page_start == 0 || page_end == 0 {
      return Err(ValidationError::ZeroPage);
    }
    if page_start > page_end {
      return Err(ValidationError::InvertedRange { start: page_start, end: page_end });
    }
    if !(1..=MAX_QUESTIONS).contains(&params.num_questions) {
      return Err(ValidationError::QuestionCount(params.num_questions));
    }

    Ok(Self {
      pdf_id: ingestion.pdf_id.clone(),
      page_start,
      page_end,
      num_questions: params.num_questions,
      difficulty: params.difficulty,
    })
  }

  pub fn pdf_id(&self) -> &str { &self.pdf_id }
  pub fn page_start(&self) -> u32 { self.page_start }
  pub fn page_end(&self) -> u32 { self.page_end }
  pub fn num_questions(&self) -> u32 { self.num_questions }
  pub fn difficulty(&self) -> Difficulty { self.difficulty }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GenerationResponse {
  pub total_generated: u32,
  pub mcqs: Vec<Mcq>,
}

/// `POST /api/mcq/generate`. The returned MCQs are checked before being handed back.
#[instrument(
  level = "info",
  target = "engine",
  skip(engine, request),
  fields(pdf_id = %request.pdf_id, pages = %format!("{}-{}", request.page_start, request.page_end), n = request.num_questions, difficulty = %request.difficulty)
)]
pub async fn submit_generation(engine: &EngineClient, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
  let start = std::time::Instant::now();
  let res = engine.client.post(engine.url(GENERATE_PATH))
    .json(request)
    .send().await
    .map_err(|e| GenerationError::Transport(e.to_string()))?;

  if !res.status().is_success() {
    let (status, body) = failure_body(res, "Generation failed. Please retry.").await;
    error!(target: "engine", status, elapsed = ?start.elapsed(), "Generation rejected");
    return Err(GenerationError::Rejected { status, body });
  }

  let body: GenerationResponse = res.json().await.map_err(|e| GenerationError::Decode(e.to_string()))?;
  check_mcqs(&body.mcqs).map_err(GenerationError::InvalidMcq)?;

  if body.total_generated as usize != body.mcqs.len() {
    warn!(target: "engine", total_generated = body.total_generated, received = body.mcqs.len(), "total_generated disagrees with list length");
  }
  info!(target: "engine", received = body.mcqs.len(), elapsed = ?start.elapsed(), "MCQs generated");
  Ok(body)
}
