//! Review model: the MCQs of the most recent generation and their JSON export.

use crate::domain::Mcq;
use crate::error::ReviewError;

/// Downloadable export of the current review set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
  pub filename: String,
  pub bytes: Vec<u8>,
}

/// `None` until the first successful generation of the session.
#[derive(Clone, Debug, Default)]
pub struct ReviewSet {
  current: Option<Vec<Mcq>>,
}

pub fn export_filename(pdf_id: Option<&str>) -> String {
  format!("mcqs_{}.json", pdf_id.filter(|id| !id.is_empty()).unwrap_or("export"))
}

impl ReviewSet {
  /// Replace wholesale. No merge with whatever was there before.
  pub fn set_current(&mut self, mcqs: Vec<Mcq>) {
    self.current = Some(mcqs);
  }

  pub fn clear(&mut self) {
    self.current = None;
  }

  pub fn is_empty(&self) -> bool {
    self.current.is_none()
  }

  pub fn mcqs(&self) -> &[Mcq] {
    self.current.as_deref().unwrap_or(&[])
  }

  pub fn len(&self) -> usize {
    self.mcqs().len()
  }

  /// Pretty JSON array (2-space indent), named after the active document.
  pub fn export_current(&self, pdf_id: Option<&str>) -> Result<ExportArtifact, ReviewError> {
    let bytes = serde_json::to_vec_pretty(self.mcqs())?;
    Ok(ExportArtifact { filename: export_filename(pdf_id), bytes })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::fixtures::mcq;

  #[test]
  fn empty_until_first_generation() {
    let mut set = ReviewSet::default();
    assert!(set.is_empty());
    set.set_current(vec![]);
    assert!(!set.is_empty());
    assert_eq!(set.len(), 0);
  }

  #[test]
  fn export_round_trips_in_order() {
    let mut set = ReviewSet::default();
    set.set_current(vec![mcq(1), mcq(2)]);
    let art = set.export_current(Some("p1")).unwrap();
    let back: Vec<Mcq> = serde_json::from_slice(&art.bytes).unwrap();
    assert_eq!(back, vec![mcq(1), mcq(2)]);
  }

  #[test]
  fn export_is_pretty_with_two_space_indent() {
    let mut set = ReviewSet::default();
    set.set_current(vec![mcq(1)]);
    let text = String::from_utf8(set.export_current(None).unwrap().bytes).unwrap();
    assert!(text.starts_with("[\n  {\n    \"question_number\": 1,"));
  }

  #[test]
  fn filename_uses_pdf_id_or_fallback() {
    assert_eq!(export_filename(Some("p1")), "mcqs_p1.json");
    assert_eq!(export_filename(None), "mcqs_export.json");
    assert_eq!(export_filename(Some("")), "mcqs_export.json");
  }

  #[test]
  fn replacement_discards_previous_set() {
    let mut set = ReviewSet::default();
    set.set_current(vec![mcq(1), mcq(2), mcq(3)]);
    set.set_current(vec![mcq(7)]);
    assert_eq!(set.mcqs().iter().map(|q| q.question_number).collect::<Vec<_>>(), vec![7]);
  }
}
