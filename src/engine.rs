//! Shared HTTP client for the remote ingestion + generation engine.
//!
//! Both contracts go through here so they agree on base URL, timeout and headers.
//! Calls log sizes, status codes and latencies, never payload contents.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Response, StatusCode};

use crate::config::Config;

pub const UPLOAD_PATH: &str = "/api/pdf/upload";
pub const GENERATE_PATH: &str = "/api/mcq/generate";

#[derive(Clone, Debug)]
pub struct EngineClient {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl EngineClient {
  pub fn from_config(cfg: &Config) -> Result<Self, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("mcq-workflow/0.1"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.request_timeout_secs))
      .default_headers(headers)
      .build()?;

    Ok(Self { client, base_url: cfg.backend_url.trim_end_matches('/').to_string() })
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }
}

/// Drain a non-success response into `(status, body)`.
/// An empty body falls back to `fallback` so the user always sees something.
pub async fn failure_body(res: Response, fallback: &str) -> (u16, String) {
  let status: StatusCode = res.status();
  let body = res.text().await.unwrap_or_default();
  let body = if body.trim().is_empty() { fallback.to_string() } else { body };
  (status.as_u16(), body)
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_joins_without_double_slash() {
    let cfg = Config::default().with_backend_url("http://engine:8000/");
    let engine = EngineClient::from_config(&cfg).unwrap();
    assert_eq!(engine.url(UPLOAD_PATH), "http://engine:8000/api/pdf/upload");
  }
}
