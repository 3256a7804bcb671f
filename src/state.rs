//! Application state: the engine client and the one workflow controller it drives.
//!
//! The controller sits behind a `RwLock` but the lock is only taken for the
//! begin/complete transitions, never across a network call.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::Config;
use crate::engine::EngineClient;
use crate::workflow::WorkflowController;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RwLock<WorkflowController>>,
    pub engine: EngineClient,
    pub config: Config,
}

impl AppState {
    #[instrument(level = "info", skip_all, fields(backend_url = %config.backend_url))]
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let engine = EngineClient::from_config(&config)?;
        info!(target: "mcq_workflow", timeout_secs = config.request_timeout_secs, "Engine client ready");
        Ok(Self::with_engine(config, engine))
    }

    pub fn with_engine(config: Config, engine: EngineClient) -> Self {
        Self {
            controller: Arc::new(RwLock::new(WorkflowController::new())),
            engine,
            config,
        }
    }
}
