//! Workflow controller: the single owner of the ingestion result, the generation
//! defaults and the review set.
//!
//! Every remote call is split in two. `begin_*` validates, marks the contract in flight
//! and hands out a ticket carrying the request identity. `complete_*` takes the ticket
//! back together with the result and applies it only if the ticket still matches the
//! current state. No lock is held across the network call, so the ticket check is
//! what keeps a late generation from attaching MCQs to a newer document.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{IngestionResult, PageDefaults};
use crate::error::{GenerationError, IngestionError, ReviewError, StaleResponse, ValidationError};
use crate::generation::{GenerationParams, GenerationRequest, GenerationResponse};
use crate::ingestion::UploadForm;
use crate::review::{ExportArtifact, ReviewSet};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No ingestion result yet; generation disabled.
    Idle,
    /// A PDF is ingested; generation enabled.
    Ingested,
    /// At least one generation succeeded for the active PDF; export enabled.
    Reviewed,
}

/// Per-contract request bookkeeping: at most one call outstanding, at most one message.
#[derive(Clone, Debug, Default)]
struct CallSlot {
    pending: Option<Uuid>,
    error: Option<String>,
}

impl CallSlot {
    fn start(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.pending = Some(id);
        self.error = None;
        id
    }

    /// Releases the slot if `id` is the outstanding request.
    fn finish(&mut self, id: Uuid) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
#[must_use]
pub struct UploadTicket {
    pub request_id: Uuid,
}

#[derive(Debug)]
#[must_use]
pub struct GenerationTicket {
    pub request_id: Uuid,
    /// The document the request was issued against.
    pub pdf_id: String,
}

/// What happened to a completed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The call failed; the message is now the stage's visible error.
    Failed(String),
    /// Stale or unknown; nothing changed beyond releasing the in-flight flag.
    Discarded,
}

#[derive(Debug, Default)]
pub struct WorkflowController {
    ingestion: Option<IngestionResult>,
    review: ReviewSet,
    upload: CallSlot,
    generation: CallSlot,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        match (&self.ingestion, self.review.is_empty()) {
            (None, _) => Stage::Idle,
            (Some(_), true) => Stage::Ingested,
            (Some(_), false) => Stage::Reviewed,
        }
    }

    pub fn ingestion(&self) -> Option<&IngestionResult> {
        self.ingestion.as_ref()
    }

    pub fn active_pdf_id(&self) -> Option<&str> {
        self.ingestion.as_ref().map(|r| r.pdf_id.as_str())
    }

    pub fn page_defaults(&self) -> Option<PageDefaults> {
        self.ingestion.as_ref().map(IngestionResult::page_defaults)
    }

    pub fn review(&self) -> &ReviewSet {
        &self.review
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload.pending.is_some()
    }

    pub fn generation_in_flight(&self) -> bool {
        self.generation.pending.is_some()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload.error.as_deref()
    }

    pub fn generation_error(&self) -> Option<&str> {
        self.generation.error.as_deref()
    }

    pub fn can_upload(&self) -> bool {
        !self.upload_in_flight()
    }

    pub fn can_generate(&self) -> bool {
        self.ingestion.is_some() && !self.generation_in_flight()
    }

    pub fn can_export(&self) -> bool {
        self.stage() == Stage::Reviewed
    }

    // --- Upload ---

    pub fn begin_upload(&mut self, form: &UploadForm) -> Result<UploadTicket, ValidationError> {
        if self.upload_in_flight() {
            return Err(ValidationError::UploadInFlight);
        }
        form.validate()?;
        let request_id = self.upload.start();
        debug!(target: "workflow", %request_id, filename = %form.filename, "Upload started");
        Ok(UploadTicket { request_id })
    }

    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<IngestionResult, IngestionError>,
    ) -> Completion {
        if !self.upload.finish(ticket.request_id) {
            debug!(target: "workflow", request_id = %ticket.request_id, "Unknown upload completion dropped");
            return Completion::Discarded;
        }
        match result {
            Ok(ingestion) => {
                let previous = self.ingestion.as_ref().map(|r| r.pdf_id.clone());
                info!(
                    target: "workflow",
                    pdf_id = %ingestion.pdf_id,
                    ?previous,
                    defaults = ?ingestion.page_defaults(),
                    "Ingestion committed; review set reset"
                );
                // The old review set and any generation error referred to the old document.
                self.review.clear();
                self.generation.error = None;
                self.ingestion = Some(ingestion);
                Completion::Applied
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(target: "workflow", error = %msg, "Upload failed");
                self.upload.error = Some(msg.clone());
                Completion::Failed(msg)
            }
        }
    }

    // --- Generation ---

    pub fn begin_generation(
        &mut self,
        params: &GenerationParams,
    ) -> Result<(GenerationTicket, GenerationRequest), ValidationError> {
        let ingestion = self.ingestion.as_ref().ok_or(ValidationError::MissingPdfId)?;
        if self.generation_in_flight() {
            return Err(ValidationError::GenerationInFlight);
        }
        let request = GenerationRequest::from_ingestion(ingestion, params)?;
        let request_id = self.generation.start();
        debug!(
            target: "workflow",
            %request_id,
            pdf_id = %request.pdf_id(),
            pages = %format!("{}-{}", request.page_start(), request.page_end()),
            "Generation started"
        );
        let ticket = GenerationTicket { request_id, pdf_id: request.pdf_id().to_string() };
        Ok((ticket, request))
    }

    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<GenerationResponse, GenerationError>,
    ) -> Completion {
        if !self.generation.finish(ticket.request_id) {
            debug!(target: "workflow", request_id = %ticket.request_id, "Unknown generation completion dropped");
            return Completion::Discarded;
        }
        if let Err(stale) = self.check_current(&ticket) {
            debug!(target: "workflow", request_id = %ticket.request_id, %stale, "Stale generation response discarded");
            return Completion::Discarded;
        }
        match result {
            Ok(res) => {
                let replaced = self.review.len();
                self.review.set_current(res.mcqs);
                info!(target: "workflow", pdf_id = %ticket.pdf_id, count = self.review.len(), replaced, "Review set replaced");
                Completion::Applied
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(target: "workflow", pdf_id = %ticket.pdf_id, error = %msg, "Generation failed");
                self.generation.error = Some(msg.clone());
                Completion::Failed(msg)
            }
        }
    }

    fn check_current(&self, ticket: &GenerationTicket) -> Result<(), StaleResponse> {
        match self.active_pdf_id() {
            Some(active) if active == ticket.pdf_id => Ok(()),
            active => Err(StaleResponse {
                kind: "generation",
                issued_for: Some(ticket.pdf_id.clone()),
                active: active.map(str::to_string),
            }),
        }
    }

    // --- Export ---

    pub fn export(&self) -> Result<ExportArtifact, ReviewError> {
        if !self.can_export() {
            return Err(ReviewError::NothingToExport);
        }
        self.review.export_current(self.active_pdf_id())
    }
}
