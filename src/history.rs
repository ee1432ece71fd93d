//! Append-only log of mastery reflection attempts for one lecture.
//!
//! Status and feedback are entered by hand after the learner runs the
//! evaluation prompt through an external assistant; nothing here grades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LecternError, Result};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
  #[default]
  Pending,
  Failed,
  Passed,
}

/// Final mark a person assigns to an attempt.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
  Passed,
  Failed,
}

impl From<Verdict> for AttemptStatus {
  fn from(v: Verdict) -> Self {
    match v {
      Verdict::Passed => AttemptStatus::Passed,
      Verdict::Failed => AttemptStatus::Failed,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionAttempt {
  pub id: String,
  pub text: String,
  #[serde(rename = "date")]
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub status: AttemptStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub feedback: Option<String>,
  #[serde(default)]
  pub prompt_ids: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MasteryHistory {
  attempts: Vec<ReflectionAttempt>,
}

impl MasteryHistory {
  pub fn attempts(&self) -> &[ReflectionAttempt] {
    &self.attempts
  }

  pub fn is_empty(&self) -> bool {
    self.attempts.is_empty()
  }

  pub fn get(&self, attempt_id: &str) -> Option<&ReflectionAttempt> {
    self.attempts.iter().find(|a| a.id == attempt_id)
  }

  /// Append a pending attempt. Ids derive from the creation time in
  /// milliseconds and are bumped until unique within this history.
  pub fn record(&mut self, text: String, prompt_ids: Vec<String>, now: DateTime<Utc>) -> &ReflectionAttempt {
    let mut stamp = now.timestamp_millis();
    while self.attempts.iter().any(|a| a.id == stamp.to_string()) {
      stamp += 1;
    }
    self.attempts.push(ReflectionAttempt {
      id: stamp.to_string(),
      text,
      created_at: now,
      status: AttemptStatus::Pending,
      feedback: None,
      prompt_ids,
    });
    &self.attempts[self.attempts.len() - 1]
  }

  /// Store pasted feedback. Status is untouched.
  pub fn attach_feedback(&mut self, attempt_id: &str, feedback: String) -> Result<&ReflectionAttempt> {
    let attempt = self.get_mut(attempt_id)?;
    attempt.feedback = Some(feedback);
    Ok(attempt)
  }

  pub fn set_status(&mut self, attempt_id: &str, verdict: Verdict) -> Result<&ReflectionAttempt> {
    let attempt = self.get_mut(attempt_id)?;
    attempt.status = verdict.into();
    Ok(attempt)
  }

  /// Latest attempt by creation time; drives the resubmission cooldown.
  pub fn most_recent(&self) -> Option<&ReflectionAttempt> {
    self.attempts.iter().max_by_key(|a| a.created_at)
  }

  pub fn any_passed(&self) -> bool {
    self.attempts.iter().any(|a| a.status == AttemptStatus::Passed)
  }

  fn get_mut(&mut self, attempt_id: &str) -> Result<&mut ReflectionAttempt> {
    self
      .attempts
      .iter_mut()
      .find(|a| a.id == attempt_id)
      .ok_or_else(|| LecternError::UnknownAttempt(attempt_id.to_string()))
  }
}
