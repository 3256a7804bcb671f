//! Public protocol structs for the local presentation API (serde ready).
//! The view is a read-only snapshot; only the controller mutates workflow state.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, IngestionResult, Mcq, PageDefaults, DEFAULT_QUESTIONS};
use crate::error::{ApiError, ValidationError};
use crate::generation::GenerationParams;
use crate::ingestion::UploadForm;
use crate::review::export_filename;
use crate::workflow::{Stage, WorkflowController};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallView {
    pub in_flight: bool,
    pub error: Option<String>,
}

/// Everything a presentation layer needs to render all three steps.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowView {
    pub stage: Stage,
    pub ingestion: Option<IngestionResult>,
    pub page_defaults: Option<PageDefaults>,
    pub upload: CallView,
    pub generation: CallView,
    pub can_upload: bool,
    pub can_generate: bool,
    pub can_export: bool,
    pub export_filename: Option<String>,
    pub mcqs: Vec<Mcq>,
}

pub fn to_view(ctl: &WorkflowController) -> WorkflowView {
    WorkflowView {
        stage: ctl.stage(),
        ingestion: ctl.ingestion().cloned(),
        page_defaults: ctl.page_defaults(),
        upload: CallView {
            in_flight: ctl.upload_in_flight(),
            error: ctl.upload_error().map(str::to_string),
        },
        generation: CallView {
            in_flight: ctl.generation_in_flight(),
            error: ctl.generation_error().map(str::to_string),
        },
        can_upload: ctl.can_upload(),
        can_generate: ctl.can_generate(),
        can_export: ctl.can_export(),
        export_filename: ctl.can_export().then(|| export_filename(ctl.active_pdf_id())),
        mcqs: ctl.review().mcqs().to_vec(),
    }
}

//
// HTTP request DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadIn {
    pub filename: String,
    pub file_base64: String,
    #[serde(default)]
    pub start_page: Option<u32>,
    #[serde(default)]
    pub end_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateIn {
    #[serde(default)]
    pub page_start: Option<u32>,
    #[serde(default)]
    pub page_end: Option<u32>,
    #[serde(default)]
    pub num_questions: Option<u32>,
    /// Kept as text so an unknown level becomes a validation error, not a 400.
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl GenerateIn {
    pub fn to_params(&self) -> Result<GenerationParams, ValidationError> {
        let difficulty = match &self.difficulty {
            Some(d) => d.parse()?,
            None => Difficulty::default(),
        };
        Ok(GenerationParams {
            page_start: self.page_start,
            page_end: self.page_end,
            num_questions: self.num_questions.unwrap_or(DEFAULT_QUESTIONS),
            difficulty,
        })
    }
}

impl UploadIn {
    pub fn into_form(self) -> Result<UploadForm, ApiError> {
        let bytes = BASE64
            .decode(self.file_base64.trim())
            .map_err(|e| ApiError::BadRequest(format!("fileBase64: {e}")))?;
        Ok(UploadForm {
            filename: self.filename,
            bytes,
            start_page: self.start_page,
            end_page: self.end_page,
        })
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
