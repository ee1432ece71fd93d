//! Loading service configuration (evaluation prompt + optional lecture bank) from TOML.
//!
//! Example:
//!
//! ```toml
//! [evaluation]
//! template = "..."
//!
//! [[lectures]]
//! category = "introductions"
//! [lectures.lecture]
//! id = "intro"
//! title = "Introduction"
//! videoUrl = "https://..."
//! ```
//!
//! Word minimums and the mastery cooldown are not configurable.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::{Lecture, LectureCategory};

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub evaluation: EvaluationPrompts,
  #[serde(default)]
  pub lectures: Vec<LectureEntry>,
}

/// A lecture filed under a curriculum category. This is also the shape the
/// authoring export produces, so exported text can be pasted into the bank.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LectureEntry {
  #[serde(default)]
  pub category: LectureCategory,
  pub lecture: Lecture,
}

/// Template for the text a learner copies into an external assistant to get
/// a mastery reflection graded. Keys: `{prompts}`, `{reflection}`, `{criteria}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EvaluationPrompts {
  pub template: String,
  pub unknown_prompt: String,
}

impl Default for EvaluationPrompts {
  fn default() -> Self {
    Self {
      template: "=== REFLECTION PROMPT(S) ===\n{prompts}\n\n=== STUDENT REFLECTION ===\n{reflection}\n\n=== EVALUATION CRITERIA ===\n{criteria}\n\nPlease evaluate this reflection against the criteria above and clearly state \"PASSED\" or \"FAILED\" at the beginning of your response, followed by detailed feedback.".into(),
      unknown_prompt: "Unknown prompt".into(),
    }
  }
}

/// Attempt to load `AppConfig` from LECTERN_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("LECTERN_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "lectern", %path, lectures = cfg.lectures.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "lectern", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "lectern", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bank_entries_parse_with_defaults() {
    let raw = r#"
      [[lectures]]
      category = "athens_to_rome"
      [lectures.lecture]
      id = "plato"
      title = "Plato"
      videoUrl = "https://example.org/plato"
      prerequisites = ["intro"]

      [[lectures.lecture.prompts.readiness]]
      id = "q1"
      text = "What is a form?"
      concepts = ["ontology"]
    "#;
    let cfg: AppConfig = toml::from_str(raw).unwrap();
    assert_eq!(cfg.lectures.len(), 1);
    let entry = &cfg.lectures[0];
    assert_eq!(entry.category, LectureCategory::AthensToRome);
    assert_eq!(entry.lecture.prerequisites, vec!["intro".to_string()]);
    assert_eq!(entry.lecture.prompts.readiness[0].concepts, vec!["ontology".to_string()]);
    assert!(cfg.evaluation.template.contains("{reflection}"));
  }

  #[test]
  fn empty_file_is_default_config() {
    let cfg: AppConfig = toml::from_str("").unwrap();
    assert!(cfg.lectures.is_empty());
    assert_eq!(cfg.evaluation.unknown_prompt, "Unknown prompt");
  }
}
