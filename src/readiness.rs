//! Readiness check: every diagnostic question needs a substantive answer
//! before the lecture opens. Short or missing answers contribute their
//! concept tags to the failed set.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{Lecture, Question};
use crate::util::word_count;

pub const READINESS_MIN_WORDS: usize = 30;

/// One completed readiness attempt. Appended to progress, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResult {
  pub passed: bool,
  pub failed_concepts: BTreeSet<String>,
  pub responses: BTreeMap<String, String>,
  #[serde(rename = "date")]
  pub timestamp: DateTime<Utc>,
}

pub fn is_valid_answer(answer: &str) -> bool {
  word_count(answer) >= READINESS_MIN_WORDS
}

#[instrument(level = "debug", skip_all, fields(questions = questions.len(), answered = responses.len()))]
pub fn evaluate(questions: &[Question], responses: &BTreeMap<String, String>, now: DateTime<Utc>) -> ReadinessResult {
  let mut failed_concepts = BTreeSet::new();
  let mut all_valid = true;

  for q in questions {
    let valid = responses.get(&q.id).map(|a| is_valid_answer(a)).unwrap_or(false);
    if !valid {
      all_valid = false;
      failed_concepts.extend(q.concepts.iter().cloned());
    }
  }

  let passed = all_valid && failed_concepts.is_empty();
  debug!(target: "progress", passed, failed = failed_concepts.len(), "Readiness evaluated");
  ReadinessResult { passed, failed_concepts, responses: responses.clone(), timestamp: now }
}

/// Status message shown after a readiness attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessOutcome {
  Incomplete,
  Ready,
  NeedsPrerequisites { lectures: Vec<String> },
  Preliminary,
}

impl ReadinessOutcome {
  /// Branch order: incomplete, then no prerequisites, then failed concepts.
  pub fn for_result(lecture: &Lecture, result: &ReadinessResult) -> Self {
    if !result.passed {
      ReadinessOutcome::Incomplete
    } else if lecture.prerequisites.is_empty() {
      ReadinessOutcome::Ready
    } else if !result.failed_concepts.is_empty() {
      ReadinessOutcome::NeedsPrerequisites { lectures: lecture.prerequisites.clone() }
    } else {
      ReadinessOutcome::Preliminary
    }
  }

  pub fn message(&self) -> String {
    match self {
      ReadinessOutcome::Incomplete => "Must answer all prompts before proceeding.".into(),
      ReadinessOutcome::Ready => "Ready for Lecture".into(),
      ReadinessOutcome::NeedsPrerequisites { lectures } => {
        format!("Needs to master lecture(s): {}", lectures.join(", "))
      }
      ReadinessOutcome::Preliminary => "Preliminary".into(),
    }
  }
}
