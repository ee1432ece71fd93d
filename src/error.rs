//! Error taxonomy for progress and authoring operations.
//!
//! Validation and state errors abort the operation before anything is written.
//! Cooldown is informational: the caller shows the remaining wait.
//! Storage read/parse failures never appear here; see `store::load_json`.

use chrono::Duration;
use thiserror::Error;

use crate::progress::{ProgressEvent, ProgressStatus};

#[derive(Error, Debug)]
pub enum LecternError {
  #[error("Please write at least {required} words (currently {actual}).")]
  TooFewWords { required: usize, actual: usize },

  #[error("Please select at least one reflection prompt that you addressed in your response.")]
  NoPromptsAddressed,

  #[error("Unknown reflection prompt: {0}")]
  UnknownPrompt(String),

  #[error("Missing required field: {0}")]
  MissingField(&'static str),

  #[error("Must answer all prompts before proceeding.")]
  ReadinessNotPassed,

  #[error("Cannot {event} while {from}.")]
  InvalidTransition { event: ProgressEvent, from: ProgressStatus },

  #[error("A mastery reflection must be recorded first.")]
  NoMasteryAttempt,

  #[error("Next mastery reflection allowed in {}h {}m.", .remaining.num_hours(), .remaining.num_minutes() % 60)]
  CooldownActive { remaining: Duration },

  #[error("Lecture with ID \"{0}\" not found")]
  UnknownLecture(String),

  #[error("Unknown reflection attempt: {0}")]
  UnknownAttempt(String),

  #[error("Serialization error: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Export error: {0}")]
  Export(#[from] toml::ser::Error),
}

impl LecternError {
  /// Stable machine-readable kind used in API error bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      LecternError::TooFewWords { .. } => "too_few_words",
      LecternError::NoPromptsAddressed => "no_prompts_addressed",
      LecternError::UnknownPrompt(_) => "unknown_prompt",
      LecternError::MissingField(_) => "missing_field",
      LecternError::ReadinessNotPassed => "readiness_not_passed",
      LecternError::InvalidTransition { .. } => "invalid_transition",
      LecternError::NoMasteryAttempt => "no_mastery_attempt",
      LecternError::CooldownActive { .. } => "cooldown_active",
      LecternError::UnknownLecture(_) => "unknown_lecture",
      LecternError::UnknownAttempt(_) => "unknown_attempt",
      LecternError::Serialize(_) => "serialize",
      LecternError::Export(_) => "export",
    }
  }

  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      LecternError::TooFewWords { .. }
        | LecternError::NoPromptsAddressed
        | LecternError::UnknownPrompt(_)
        | LecternError::MissingField(_)
    )
  }
}

pub type Result<T> = std::result::Result<T, LecternError>;
