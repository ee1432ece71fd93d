//! Gates in front of reflection submissions.
//!
//! Initial: at least 50 words, latest text wins.
//! Mastery: at least 150 words, at least one addressed mastery prompt, and
//! 24 hours since the most recent attempt.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::Lecture;
use crate::error::{LecternError, Result};
use crate::history::MasteryHistory;
use crate::util::word_count;

pub const INITIAL_MIN_WORDS: usize = 50;
pub const MASTERY_MIN_WORDS: usize = 150;
pub const MASTERY_COOLDOWN_HOURS: i64 = 24;

fn require_words(text: &str, required: usize) -> Result<()> {
  let actual = word_count(text);
  if actual < required {
    return Err(LecternError::TooFewWords { required, actual });
  }
  Ok(())
}

pub fn check_initial(text: &str) -> Result<()> {
  require_words(text, INITIAL_MIN_WORDS)
}

/// Wait left before another mastery attempt may be submitted, if any.
pub fn cooldown_remaining(history: &MasteryHistory, now: DateTime<Utc>) -> Option<Duration> {
  let last = history.most_recent()?;
  let open_at = last.created_at + Duration::hours(MASTERY_COOLDOWN_HOURS);
  let remaining = open_at - now;
  (remaining > Duration::zero()).then_some(remaining)
}

/// Validate a mastery submission and return the addressed prompt ids,
/// deduplicated in the order given.
pub fn check_mastery(
  lecture: &Lecture,
  text: &str,
  addressed: &[String],
  history: &MasteryHistory,
  now: DateTime<Utc>,
) -> Result<Vec<String>> {
  if let Some(remaining) = cooldown_remaining(history, now) {
    debug!(target: "progress", lecture = %lecture.id, remaining_secs = remaining.num_seconds(), "Mastery cooldown active");
    return Err(LecternError::CooldownActive { remaining });
  }
  require_words(text, MASTERY_MIN_WORDS)?;

  let mut ids: Vec<String> = Vec::with_capacity(addressed.len());
  for id in addressed {
    if ids.contains(id) {
      continue;
    }
    let is_mastery_prompt = lecture.mastery_prompts().any(|p| &p.id == id);
    if !is_mastery_prompt {
      return Err(LecternError::UnknownPrompt(id.clone()));
    }
    ids.push(id.clone());
  }
  if ids.is_empty() {
    return Err(LecternError::NoPromptsAddressed);
  }
  Ok(ids)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ReflectionKind, ReflectionPrompt};

  fn words(n: usize) -> String {
    vec!["idea"; n].join(" ")
  }

  fn lecture() -> Lecture {
    let mut lecture = Lecture { id: "intro".into(), ..Default::default() };
    for (id, kind) in [("m1", ReflectionKind::Mastery), ("m2", ReflectionKind::Mastery), ("i1", ReflectionKind::Initial)] {
      lecture.prompts.reflection.push(ReflectionPrompt {
        id: id.into(),
        text: format!("prompt {id}"),
        kind,
        concepts: vec![],
      });
    }
    lecture
  }

  #[test]
  fn initial_gate_boundary() {
    let err = check_initial(&words(49)).unwrap_err();
    assert!(matches!(err, LecternError::TooFewWords { required: 50, actual: 49 }));
    assert!(check_initial(&words(50)).is_ok());
  }

  #[test]
  fn mastery_needs_an_addressed_prompt() {
    let history = MasteryHistory::default();
    let err = check_mastery(&lecture(), &words(150), &[], &history, Utc::now()).unwrap_err();
    assert!(matches!(err, LecternError::NoPromptsAddressed));

    let ids = check_mastery(&lecture(), &words(150), &["m1".into()], &history, Utc::now()).unwrap();
    assert_eq!(ids, vec!["m1".to_string()]);
  }

  #[test]
  fn mastery_word_floor() {
    let history = MasteryHistory::default();
    let err = check_mastery(&lecture(), &words(149), &["m1".into()], &history, Utc::now()).unwrap_err();
    assert!(matches!(err, LecternError::TooFewWords { required: 150, actual: 149 }));
  }

  #[test]
  fn addressed_ids_must_be_mastery_prompts() {
    let history = MasteryHistory::default();
    let err = check_mastery(&lecture(), &words(150), &["i1".into()], &history, Utc::now()).unwrap_err();
    assert!(matches!(err, LecternError::UnknownPrompt(id) if id == "i1"));

    let ids = check_mastery(
      &lecture(),
      &words(150),
      &["m2".into(), "m1".into(), "m2".into()],
      &history,
      Utc::now(),
    )
    .unwrap();
    assert_eq!(ids, vec!["m2".to_string(), "m1".to_string()]);
  }

  #[test]
  fn cooldown_blocks_within_a_day() {
    let now = Utc::now();
    let mut history = MasteryHistory::default();
    history.record(words(150), vec!["m1".into()], now - Duration::hours(10));

    let err = check_mastery(&lecture(), &words(150), &["m1".into()], &history, now).unwrap_err();
    match err {
      LecternError::CooldownActive { remaining } => assert_eq!(remaining, Duration::hours(14)),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn cooldown_lifts_after_a_day() {
    let now = Utc::now();
    let mut history = MasteryHistory::default();
    history.record(words(150), vec!["m1".into()], now - Duration::hours(25));
    assert!(cooldown_remaining(&history, now).is_none());
    assert!(check_mastery(&lecture(), &words(150), &["m1".into()], &history, now).is_ok());
  }

  #[test]
  fn cooldown_open_exactly_at_24_hours() {
    let now = Utc::now();
    let mut history = MasteryHistory::default();
    history.record("x".into(), vec![], now - Duration::hours(24));
    assert!(cooldown_remaining(&history, now).is_none());
  }
}
