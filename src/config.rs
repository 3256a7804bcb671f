//! Loading client configuration from TOML, with environment overrides.
//!
//! Expected schema (all keys optional):
//!
//! ```toml
//! backend_url = "http://localhost:8000"
//! request_timeout_secs = 300
//! port = 3000
//! static_dir = "./static"
//! max_upload_mb = 50
//! ```
//!
//! Env variables:
//!   MCQ_CONFIG_PATH : path to the TOML file above
//!   MCQ_BACKEND_URL : overrides `backend_url`
//!   PORT            : overrides `port`

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Host of the ingestion + generation engine.
  pub backend_url: String,
  /// Generation runs retrieval and an LLM per question, so this is generous.
  pub request_timeout_secs: u64,
  pub port: u16,
  pub static_dir: String,
  /// Largest PDF accepted by the local API.
  pub max_upload_mb: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      backend_url: DEFAULT_BACKEND_URL.into(),
      request_timeout_secs: 300,
      port: 3000,
      static_dir: "./static".into(),
      max_upload_mb: 50,
    }
  }
}

impl Config {
  /// File (if any) first, then env overrides. Never fails: bad input is logged and ignored.
  pub fn load() -> Self {
    let mut cfg = load_config_file_from_env().unwrap_or_default();
    if let Ok(url) = std::env::var("MCQ_BACKEND_URL") {
      if !url.trim().is_empty() {
        cfg.backend_url = url;
      }
    }
    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
      cfg.port = port;
    }
    cfg.backend_url = cfg.backend_url.trim_end_matches('/').to_string();
    cfg
  }

  pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
    self.backend_url = url.into().trim_end_matches('/').to_string();
    self
  }
}

/// Attempt to load `Config` from MCQ_CONFIG_PATH. On any parsing/IO error, returns None.
fn load_config_file_from_env() -> Option<Config> {
  let path = std::env::var("MCQ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse(&s) {
      Ok(cfg) => {
        info!(target: "mcq_workflow", %path, "Loaded client config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mcq_workflow", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mcq_workflow", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

fn parse(s: &str) -> Result<Config, toml::de::Error> {
  toml::from_str::<Config>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg = parse("backend_url = \"http://engine:9000\"").unwrap();
    assert_eq!(cfg.backend_url, "http://engine:9000");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.request_timeout_secs, 300);
  }

  #[test]
  fn trailing_slash_is_trimmed() {
    let cfg = Config::default().with_backend_url("http://engine:9000/");
    assert_eq!(cfg.backend_url, "http://engine:9000");
  }
}
