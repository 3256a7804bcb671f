//! Domain models shared by the contracts: ingestion results, page ranges,
//! difficulty levels, and the bilingual MCQ itself.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound on questions per generation request, matching the engine's limit.
pub const MAX_QUESTIONS: u32 = 20;
pub const DEFAULT_QUESTIONS: u32 = 10;

/// Inclusive `[start_page, end_page]` bounds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRange {
  pub start_page: u32,
  pub end_page: u32,
}

impl PageRange {
  /// Copy with `start_page <= end_page`.
  pub fn normalized(self) -> Self {
    if self.start_page > self.end_page {
      Self { start_page: self.end_page, end_page: self.start_page }
    } else {
      self
    }
  }
}

/// What the ingestion engine reports back after a successful upload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IngestionResult {
  pub pdf_id: String,
  #[serde(default)] pub filename: String,
  #[serde(default)] pub total_pages: Option<u32>,
  #[serde(default)] pub chunks_created: u32,
  #[serde(default)] pub ingested_range: Option<PageRange>,
  #[serde(default)] pub status: Option<String>,
}

/// Generation page defaults derived from an ingestion result.
/// `end_page` is `None` when the engine reported neither a range nor a page count.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageDefaults {
  pub start_page: u32,
  pub end_page: Option<u32>,
}

impl IngestionResult {
  pub fn page_defaults(&self) -> PageDefaults {
    match self.ingested_range.map(PageRange::normalized) {
      Some(r) => PageDefaults { start_page: r.start_page, end_page: Some(r.end_page) },
      None => PageDefaults { start_page: 1, end_page: self.total_pages },
    }
  }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "easy" => Ok(Difficulty::Easy),
      "medium" => Ok(Difficulty::Medium),
      "hard" => Ok(Difficulty::Hard),
      _ => Err(ValidationError::InvalidDifficulty(s.to_string())),
    }
  }
}

/// One answer option. `source` cites the passage the engine drew it from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
  pub id: String,
  pub text_en: String,
  pub text_mn: String,
  pub is_correct: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

/// A generated bilingual (English / Mongolian) multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mcq {
  pub question_number: u32,
  pub question_en: String,
  pub question_mn: String,
  pub choices: Vec<Choice>,
  pub explanation_en: String,
  pub explanation_mn: String,
  pub concept: String,
  pub difficulty: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub page_reference: Option<String>,
}

impl Mcq {
  /// Checks the per-question invariants; returns a human readable reason on failure.
  pub fn check(&self) -> Result<(), String> {
    let n = self.question_number;
    if self.question_en.trim().is_empty() || self.question_mn.trim().is_empty() {
      return Err(format!("question {n}: missing English or Mongolian phrasing"));
    }
    if self.choices.len() < 2 {
      return Err(format!("question {n}: needs at least 2 choices, got {}", self.choices.len()));
    }
    let correct = self.choices.iter().filter(|c| c.is_correct).count();
    if correct != 1 {
      return Err(format!("question {n}: expected exactly one correct choice, got {correct}"));
    }
    let mut ids = HashSet::new();
    for c in &self.choices {
      if !ids.insert(c.id.as_str()) {
        return Err(format!("question {n}: duplicate choice id {:?}", c.id));
      }
    }
    Ok(())
  }
}

/// Checks every question plus uniqueness of `question_number` across the list.
pub fn check_mcqs(mcqs: &[Mcq]) -> Result<(), String> {
  let mut numbers = HashSet::new();
  for q in mcqs {
    q.check()?;
    if !numbers.insert(q.question_number) {
      return Err(format!("duplicate question_number {}", q.question_number));
    }
  }
  Ok(())
}
