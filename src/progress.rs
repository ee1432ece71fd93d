//! Learner progress for one lecture: the status lifecycle, its transition
//! table, and the tracker that commits each transition to the store.
//!
//! Lifecycle: unwatched → preliminary → ready-to-watch → reflected → mastered.
//! Every accepted event appends to the status history and writes the whole
//! record in one `set`. Backward moves happen only through `reset`.

use std::{
  collections::BTreeMap,
  fmt,
  sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::domain::Lecture;
use crate::error::{LecternError, Result};
use crate::history::{MasteryHistory, ReflectionAttempt, Verdict};
use crate::readiness::{self, ReadinessOutcome, ReadinessResult};
use crate::reflection;
use crate::store::{load_json, load_json_opt, save_json, KeyValueStore, LectureKeys};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
  #[default]
  Unwatched,
  Preliminary,
  ReadyToWatch,
  Reflected,
  Mastered,
  /// Reserved for re-certification; no event leads here yet.
  NeedsReview,
  /// Reserved for re-certification; no event leads here yet.
  Remastered,
}

impl fmt::Display for ProgressStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ProgressStatus::Unwatched => "unwatched",
      ProgressStatus::Preliminary => "preliminary",
      ProgressStatus::ReadyToWatch => "ready-to-watch",
      ProgressStatus::Reflected => "reflected",
      ProgressStatus::Mastered => "mastered",
      ProgressStatus::NeedsReview => "needs-review",
      ProgressStatus::Remastered => "remastered",
    };
    f.write_str(s)
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressEvent {
  StartReadiness,
  ConfirmWatch,
  CompleteInitialReflection,
  CompleteMasteryReflection,
}

impl fmt::Display for ProgressEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ProgressEvent::StartReadiness => "start readiness",
      ProgressEvent::ConfirmWatch => "confirm watch",
      ProgressEvent::CompleteInitialReflection => "complete initial reflection",
      ProgressEvent::CompleteMasteryReflection => "complete mastery reflection",
    };
    f.write_str(s)
  }
}

impl ProgressEvent {
  pub fn target(self) -> ProgressStatus {
    match self {
      ProgressEvent::StartReadiness => ProgressStatus::Preliminary,
      ProgressEvent::ConfirmWatch => ProgressStatus::ReadyToWatch,
      ProgressEvent::CompleteInitialReflection => ProgressStatus::Reflected,
      ProgressEvent::CompleteMasteryReflection => ProgressStatus::Mastered,
    }
  }

  /// States the event may fire from. Each includes its own target so
  /// re-firing is a harmless self-loop.
  pub fn allowed_from(self) -> &'static [ProgressStatus] {
    use ProgressStatus::*;
    match self {
      ProgressEvent::StartReadiness => &[Unwatched, Preliminary],
      ProgressEvent::ConfirmWatch => &[Preliminary, ReadyToWatch],
      ProgressEvent::CompleteInitialReflection => &[ReadyToWatch, Reflected],
      ProgressEvent::CompleteMasteryReflection => &[Reflected, Mastered],
    }
  }
}

pub fn transition(from: ProgressStatus, event: ProgressEvent) -> Result<ProgressStatus> {
  if event.allowed_from().contains(&from) {
    Ok(event.target())
  } else {
    Err(LecternError::InvalidTransition { event, from })
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusChange {
  pub status: ProgressStatus,
  pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Reflections {
  #[serde(default)]
  pub initial: String,
  /// Ids of recorded mastery attempts; the attempts live in the history key.
  #[serde(default)]
  pub mastery: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LectureProgress {
  pub lecture_id: String,
  #[serde(default)]
  pub status: ProgressStatus,
  #[serde(default)]
  pub status_history: Vec<StatusChange>,
  #[serde(default)]
  pub readiness_checks: Vec<ReadinessResult>,
  #[serde(default)]
  pub reflections: Reflections,
}

impl LectureProgress {
  pub fn new(lecture_id: &str) -> Self {
    Self { lecture_id: lecture_id.to_string(), ..Default::default() }
  }

  pub fn check(&self, event: ProgressEvent) -> Result<ProgressStatus> {
    transition(self.status, event)
  }

  pub fn apply(&mut self, event: ProgressEvent, now: DateTime<Utc>) -> Result<ProgressStatus> {
    let next = self.check(event)?;
    self.status = next;
    self.status_history.push(StatusChange { status: next, date: now });
    Ok(next)
  }

  pub fn latest_readiness(&self) -> Option<&ReadinessResult> {
    self.readiness_checks.last()
  }
}

/// Result of a readiness submission.
#[derive(Clone, Debug)]
pub struct ReadinessReport {
  pub result: ReadinessResult,
  pub outcome: ReadinessOutcome,
  pub progress: LectureProgress,
}

/// Every mutating operation holds `writes` for its whole
/// load, gate, save sequence. Clones share the lock.
pub struct ProgressTracker<S: KeyValueStore + ?Sized> {
  store: Arc<S>,
  writes: Arc<Mutex<()>>,
}

impl<S: KeyValueStore + ?Sized> Clone for ProgressTracker<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), writes: self.writes.clone() }
  }
}

impl<S: KeyValueStore + ?Sized> ProgressTracker<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, writes: Arc::new(Mutex::new(())) }
  }

  fn write_guard(&self) -> MutexGuard<'_, ()> {
    self.writes.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Stored progress, or a fresh `unwatched` record if none is usable.
  pub fn load(&self, lecture_id: &str) -> LectureProgress {
    match load_json_opt::<LectureProgress, _>(&*self.store, &LectureKeys::progress(lecture_id)) {
      Some(mut p) => {
        if p.lecture_id != lecture_id {
          warn!(target: "progress", lecture = %lecture_id, stored = %p.lecture_id, "Stored progress names another lecture; rebinding.");
          p.lecture_id = lecture_id.to_string();
        }
        p
      }
      None => LectureProgress::new(lecture_id),
    }
  }

  fn persist(&self, progress: &LectureProgress) -> Result<()> {
    save_json(&*self.store, &LectureKeys::progress(&progress.lecture_id), progress)?;
    Ok(())
  }

  pub fn mastery_history(&self, lecture_id: &str) -> MasteryHistory {
    load_json(&*self.store, &LectureKeys::mastery_history(lecture_id))
  }

  fn persist_history(&self, lecture_id: &str, history: &MasteryHistory) -> Result<()> {
    save_json(&*self.store, &LectureKeys::mastery_history(lecture_id), history)?;
    Ok(())
  }

  #[instrument(level = "info", skip(self), fields(%lecture_id))]
  pub fn start_readiness(&self, lecture_id: &str, now: DateTime<Utc>) -> Result<LectureProgress> {
    let _guard = self.write_guard();
    let mut progress = self.load(lecture_id);
    let status = progress.apply(ProgressEvent::StartReadiness, now)?;
    self.persist(&progress)?;
    info!(target: "progress", %lecture_id, %status, "Readiness started");
    Ok(progress)
  }

  pub fn readiness_draft(&self, lecture_id: &str) -> BTreeMap<String, String> {
    load_json(&*self.store, &LectureKeys::readiness_draft(lecture_id))
  }

  pub fn save_readiness_draft(&self, lecture_id: &str, responses: &BTreeMap<String, String>) -> Result<()> {
    let _guard = self.write_guard();
    self.persist_draft(lecture_id, responses)
  }

  fn persist_draft(&self, lecture_id: &str, responses: &BTreeMap<String, String>) -> Result<()> {
    save_json(&*self.store, &LectureKeys::readiness_draft(lecture_id), responses)?;
    Ok(())
  }

  /// Evaluate and record a readiness attempt. Failing attempts are recorded
  /// too; they only block `confirm_watch`.
  #[instrument(level = "info", skip(self, lecture, responses), fields(lecture = %lecture.id, answered = responses.len()))]
  pub fn submit_readiness(
    &self,
    lecture: &Lecture,
    responses: &BTreeMap<String, String>,
    now: DateTime<Utc>,
  ) -> Result<ReadinessReport> {
    let _guard = self.write_guard();
    let mut progress = self.load(&lecture.id);
    progress.check(ProgressEvent::StartReadiness)?;

    let result = readiness::evaluate(&lecture.prompts.readiness, responses, now);
    let outcome = ReadinessOutcome::for_result(lecture, &result);

    self.persist_draft(&lecture.id, responses)?;
    progress.readiness_checks.push(result.clone());
    if progress.status == ProgressStatus::Unwatched {
      progress.apply(ProgressEvent::StartReadiness, now)?;
    }
    self.persist(&progress)?;

    info!(target: "progress", lecture = %lecture.id, passed = result.passed, failed = result.failed_concepts.len(), outcome = %outcome.message(), "Readiness recorded");
    Ok(ReadinessReport { result, outcome, progress })
  }

  /// Allowed while readiness is in progress or after a passing attempt.
  #[instrument(level = "info", skip(self), fields(%lecture_id))]
  pub fn confirm_watch(&self, lecture_id: &str, now: DateTime<Utc>) -> Result<LectureProgress> {
    let _guard = self.write_guard();
    let mut progress = self.load(lecture_id);
    progress.check(ProgressEvent::ConfirmWatch)?;
    if progress.latest_readiness().is_some_and(|r| !r.passed) {
      return Err(LecternError::ReadinessNotPassed);
    }
    progress.apply(ProgressEvent::ConfirmWatch, now)?;
    save_json(&*self.store, &LectureKeys::watched(lecture_id), &true)?;
    self.persist(&progress)?;
    info!(target: "progress", %lecture_id, "Lecture marked as watched");
    Ok(progress)
  }

  pub fn watched(&self, lecture_id: &str) -> bool {
    load_json(&*self.store, &LectureKeys::watched(lecture_id))
  }

  #[instrument(level = "info", skip(self, text), fields(%lecture_id, text_len = text.len()))]
  pub fn submit_initial_reflection(&self, lecture_id: &str, text: &str, now: DateTime<Utc>) -> Result<LectureProgress> {
    let _guard = self.write_guard();
    let mut progress = self.load(lecture_id);
    progress.check(ProgressEvent::CompleteInitialReflection)?;
    reflection::check_initial(text)?;

    self.store.set(&LectureKeys::initial_reflection(lecture_id), text.to_string());
    progress.reflections.initial = text.to_string();
    progress.apply(ProgressEvent::CompleteInitialReflection, now)?;
    self.persist(&progress)?;
    info!(target: "progress", %lecture_id, "Initial reflection accepted");
    Ok(progress)
  }

  /// Gate, record a pending attempt and move to `mastered` in one progress write.
  #[instrument(level = "info", skip(self, lecture, text, addressed), fields(lecture = %lecture.id, text_len = text.len()))]
  pub fn submit_mastery_reflection(
    &self,
    lecture: &Lecture,
    text: &str,
    addressed: &[String],
    now: DateTime<Utc>,
  ) -> Result<(ReflectionAttempt, LectureProgress)> {
    let _guard = self.write_guard();
    let mut progress = self.load(&lecture.id);
    progress.check(ProgressEvent::CompleteMasteryReflection)?;
    let mut history = self.mastery_history(&lecture.id);
    let prompt_ids = reflection::check_mastery(lecture, text, addressed, &history, now)?;

    let attempt = history.record(text.to_string(), prompt_ids, now).clone();
    self.persist_history(&lecture.id, &history)?;
    progress.reflections.mastery.push(attempt.id.clone());
    progress.apply(ProgressEvent::CompleteMasteryReflection, now)?;
    self.persist(&progress)?;
    info!(target: "progress", lecture = %lecture.id, attempt = %attempt.id, "Mastery reflection recorded");
    Ok((attempt, progress))
  }

  /// Reaching `mastered` requires a recorded attempt, not a passing one.
  #[instrument(level = "info", skip(self), fields(%lecture_id))]
  pub fn complete_mastery_reflection(&self, lecture_id: &str, now: DateTime<Utc>) -> Result<LectureProgress> {
    let _guard = self.write_guard();
    let mut progress = self.load(lecture_id);
    progress.check(ProgressEvent::CompleteMasteryReflection)?;
    if self.mastery_history(lecture_id).is_empty() {
      return Err(LecternError::NoMasteryAttempt);
    }
    progress.apply(ProgressEvent::CompleteMasteryReflection, now)?;
    self.persist(&progress)?;
    Ok(progress)
  }

  #[instrument(level = "info", skip(self, feedback), fields(%lecture_id, %attempt_id, feedback_len = feedback.len()))]
  pub fn attach_feedback(&self, lecture_id: &str, attempt_id: &str, feedback: &str) -> Result<ReflectionAttempt> {
    if feedback.trim().is_empty() {
      return Err(LecternError::MissingField("feedback"));
    }
    let _guard = self.write_guard();
    let mut history = self.mastery_history(lecture_id);
    let attempt = history.attach_feedback(attempt_id, feedback.to_string())?.clone();
    self.persist_history(lecture_id, &history)?;
    info!(target: "progress", %lecture_id, %attempt_id, "Feedback attached");
    Ok(attempt)
  }

  #[instrument(level = "info", skip(self), fields(%lecture_id, %attempt_id))]
  pub fn set_attempt_status(&self, lecture_id: &str, attempt_id: &str, verdict: Verdict) -> Result<ReflectionAttempt> {
    let _guard = self.write_guard();
    let mut history = self.mastery_history(lecture_id);
    let attempt = history.set_status(attempt_id, verdict)?.clone();
    self.persist_history(lecture_id, &history)?;
    info!(target: "progress", %lecture_id, %attempt_id, status = ?attempt.status, "Attempt status set");
    Ok(attempt)
  }

  /// Erase every key for the lecture and return the fresh record.
  #[instrument(level = "info", skip(self), fields(%lecture_id))]
  pub fn reset(&self, lecture_id: &str) -> LectureProgress {
    let _guard = self.write_guard();
    for key in LectureKeys::all(lecture_id) {
      self.store.remove(&key);
    }
    warn!(target: "progress", %lecture_id, "Progress reset");
    LectureProgress::new(lecture_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Question, ReflectionKind, ReflectionPrompt};
  use crate::history::AttemptStatus;
  use crate::store::MemoryStore;
  use chrono::Duration;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn words(n: usize) -> String {
    vec!["thought"; n].join(" ")
  }

  fn lecture() -> Lecture {
    let mut lecture = Lecture {
      id: "intro".into(),
      title: "Intro".into(),
      video_url: "https://example.org/v".into(),
      ..Default::default()
    };
    lecture.prompts.readiness = vec![
      Question { id: "q1".into(), text: "one".into(), concepts: vec!["ontology".into()], prerequisites: vec![] },
      Question { id: "q2".into(), text: "two".into(), concepts: vec!["ethics".into()], prerequisites: vec![] },
    ];
    lecture.prompts.reflection = vec![ReflectionPrompt {
      id: "m1".into(),
      text: "explain".into(),
      kind: ReflectionKind::Mastery,
      concepts: vec![],
    }];
    lecture
  }

  fn answers(n: usize) -> BTreeMap<String, String> {
    [("q1".to_string(), words(n)), ("q2".to_string(), words(n))].into_iter().collect()
  }

  fn tracker() -> (Arc<MemoryStore>, ProgressTracker<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (store.clone(), ProgressTracker::new(store))
  }

  /// Drive a fresh lecture to `reflected`.
  fn reflected<S: KeyValueStore + ?Sized>(tracker: &ProgressTracker<S>, now: DateTime<Utc>) {
    let lecture = lecture();
    tracker.submit_readiness(&lecture, &answers(30), now).unwrap();
    tracker.confirm_watch(&lecture.id, now).unwrap();
    tracker.submit_initial_reflection(&lecture.id, &words(50), now).unwrap();
  }

  #[test]
  fn transition_table_rejects_skips_and_backward_moves() {
    use ProgressStatus::*;
    assert_eq!(transition(Unwatched, ProgressEvent::StartReadiness).unwrap(), Preliminary);
    assert!(transition(Unwatched, ProgressEvent::ConfirmWatch).is_err());
    assert!(transition(Mastered, ProgressEvent::StartReadiness).is_err());
    assert!(transition(Reflected, ProgressEvent::ConfirmWatch).is_err());
    for event in [
      ProgressEvent::StartReadiness,
      ProgressEvent::ConfirmWatch,
      ProgressEvent::CompleteInitialReflection,
      ProgressEvent::CompleteMasteryReflection,
    ] {
      assert!(transition(NeedsReview, event).is_err());
      assert!(transition(Remastered, event).is_err());
    }
  }

  #[test]
  fn missing_record_loads_as_unwatched() {
    let (_, tracker) = tracker();
    let p = tracker.load("intro");
    assert_eq!(p.status, ProgressStatus::Unwatched);
    assert_eq!(p.lecture_id, "intro");
    assert!(p.status_history.is_empty());
  }

  #[test]
  fn corrupt_record_loads_as_unwatched() {
    let (store, tracker) = tracker();
    store.set("lecture-progress-intro", "{\"status\": 7".into());
    assert_eq!(tracker.load("intro"), LectureProgress::new("intro"));
  }

  #[test]
  fn start_readiness_twice_stays_preliminary() {
    let (_, tracker) = tracker();
    let now = Utc::now();
    tracker.start_readiness("intro", now).unwrap();
    let p = tracker.start_readiness("intro", now).unwrap();
    assert_eq!(p.status, ProgressStatus::Preliminary);
    assert_eq!(p.status_history.len(), 2);
    assert!(p.readiness_checks.is_empty());
    assert_eq!(tracker.load("intro"), p);
  }

  #[test]
  fn failed_readiness_is_recorded_and_blocks_watch() {
    let (_, tracker) = tracker();
    let lecture = lecture();
    let report = tracker.submit_readiness(&lecture, &answers(10), Utc::now()).unwrap();
    assert!(!report.result.passed);
    assert_eq!(report.outcome, ReadinessOutcome::Incomplete);
    assert_eq!(report.progress.status, ProgressStatus::Preliminary);
    assert_eq!(report.progress.readiness_checks.len(), 1);

    let err = tracker.confirm_watch(&lecture.id, Utc::now()).unwrap_err();
    assert!(matches!(err, LecternError::ReadinessNotPassed));
    assert!(!tracker.watched(&lecture.id));
    assert_eq!(tracker.readiness_draft(&lecture.id), answers(10));
  }

  #[test]
  fn confirm_watch_allowed_while_readiness_in_progress() {
    let (_, tracker) = tracker();
    let now = Utc::now();
    tracker.start_readiness("intro", now).unwrap();
    let p = tracker.confirm_watch("intro", now).unwrap();
    assert_eq!(p.status, ProgressStatus::ReadyToWatch);
    assert!(tracker.watched("intro"));
  }

  #[test]
  fn initial_reflection_gate_does_not_mutate_on_reject() {
    let (_, tracker) = tracker();
    let lecture = lecture();
    let now = Utc::now();
    tracker.submit_readiness(&lecture, &answers(30), now).unwrap();
    let before = tracker.confirm_watch(&lecture.id, now).unwrap();

    let err = tracker.submit_initial_reflection(&lecture.id, &words(49), now).unwrap_err();
    assert!(matches!(err, LecternError::TooFewWords { required: 50, actual: 49 }));
    assert_eq!(tracker.load(&lecture.id), before);
    assert!(tracker.store.get(&LectureKeys::initial_reflection(&lecture.id)).is_none());

    let text = format!("  {}\n", words(50));
    let p = tracker.submit_initial_reflection(&lecture.id, &text, now).unwrap();
    assert_eq!(p.status, ProgressStatus::Reflected);
    assert_eq!(p.reflections.initial, text);
    assert_eq!(tracker.store.get(&LectureKeys::initial_reflection(&lecture.id)).as_deref(), Some(text.as_str()));
  }

  #[test]
  fn mastery_without_attempt_cannot_complete() {
    let (_, tracker) = tracker();
    let now = Utc::now();
    reflected(&tracker, now);
    let err = tracker.complete_mastery_reflection("intro", now).unwrap_err();
    assert!(matches!(err, LecternError::NoMasteryAttempt));
  }

  #[test]
  fn mastery_submission_appends_and_respects_cooldown() {
    let (_, tracker) = tracker();
    let lecture = lecture();
    let t0 = Utc::now() - Duration::hours(30);
    reflected(&tracker, t0);

    let err = tracker.submit_mastery_reflection(&lecture, &words(150), &[], t0).unwrap_err();
    assert!(matches!(err, LecternError::NoPromptsAddressed));
    assert!(tracker.mastery_history(&lecture.id).is_empty());

    let (first, p) = tracker.submit_mastery_reflection(&lecture, &words(150), &["m1".into()], t0).unwrap();
    assert_eq!(p.status, ProgressStatus::Mastered);
    assert_eq!(first.status, AttemptStatus::Pending);

    let err = tracker
      .submit_mastery_reflection(&lecture, &words(150), &["m1".into()], t0 + Duration::hours(10))
      .unwrap_err();
    assert!(matches!(err, LecternError::CooldownActive { .. }));

    let (second, p) = tracker
      .submit_mastery_reflection(&lecture, &words(151), &["m1".into()], t0 + Duration::hours(25))
      .unwrap();
    let history = tracker.mastery_history(&lecture.id);
    assert_eq!(history.attempts().len(), 2);
    assert_eq!(history.attempts()[0].id, first.id);
    assert_eq!(history.attempts()[1].id, second.id);
    assert_eq!(p.reflections.mastery, vec![first.id, second.id]);
    assert_eq!(p.status, ProgressStatus::Mastered);
  }

  #[test]
  fn mastery_before_reflection_is_an_invalid_transition() {
    let (_, tracker) = tracker();
    let err = tracker
      .submit_mastery_reflection(&lecture(), &words(200), &["m1".into()], Utc::now())
      .unwrap_err();
    assert!(matches!(err, LecternError::InvalidTransition { from: ProgressStatus::Unwatched, .. }));
  }

  #[test]
  fn feedback_and_status_are_manual() {
    let (_, tracker) = tracker();
    let lecture = lecture();
    let now = Utc::now();
    reflected(&tracker, now);
    let (attempt, _) = tracker.submit_mastery_reflection(&lecture, &words(150), &["m1".into()], now).unwrap();

    assert!(matches!(
      tracker.attach_feedback(&lecture.id, &attempt.id, "   "),
      Err(LecternError::MissingField("feedback"))
    ));
    let with_feedback = tracker.attach_feedback(&lecture.id, &attempt.id, "PASSED: clear.").unwrap();
    assert_eq!(with_feedback.status, AttemptStatus::Pending);

    tracker.set_attempt_status(&lecture.id, &attempt.id, Verdict::Passed).unwrap();
    let history = tracker.mastery_history(&lecture.id);
    assert!(history.any_passed());
    assert_eq!(history.get(&attempt.id).unwrap().feedback.as_deref(), Some("PASSED: clear."));
  }

  #[test]
  fn reset_clears_everything() {
    let (store, tracker) = tracker();
    let lecture = lecture();
    let now = Utc::now();
    reflected(&tracker, now);
    tracker.submit_mastery_reflection(&lecture, &words(150), &["m1".into()], now).unwrap();
    assert!(store.keys().len() >= 5);

    let p = tracker.reset(&lecture.id);
    assert_eq!(p.status, ProgressStatus::Unwatched);
    assert!(p.status_history.is_empty());
    assert!(p.readiness_checks.is_empty());
    assert_eq!(p.reflections, Reflections::default());
    assert!(store.keys().is_empty());
    assert_eq!(tracker.load(&lecture.id), p);
    assert!(tracker.mastery_history(&lecture.id).is_empty());
  }

  #[test]
  fn reset_on_fresh_lecture_is_harmless() {
    let (store, tracker) = tracker();
    store.set("lecture-progress-other", "{}".into());
    let p = tracker.reset("intro");
    assert_eq!(p, LectureProgress::new("intro"));
    assert_eq!(store.keys(), vec!["lecture-progress-other".to_string()]);
  }

  #[test]
  fn record_serializes_with_kebab_case_status() {
    let mut p = LectureProgress::new("intro");
    p.apply(ProgressEvent::StartReadiness, Utc::now()).unwrap();
    p.apply(ProgressEvent::ConfirmWatch, Utc::now()).unwrap();
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["status"], "ready-to-watch");
    assert_eq!(json["lectureId"], "intro");
    assert_eq!(json["statusHistory"].as_array().unwrap().len(), 2);
  }

  /// Slows history reads so concurrent submissions overlap, and counts
  /// progress record writes.
  #[derive(Default)]
  struct SlowStore {
    inner: MemoryStore,
    progress_writes: AtomicUsize,
  }

  impl KeyValueStore for SlowStore {
    fn get(&self, key: &str) -> Option<String> {
      if key.starts_with("mastery-reflections-") {
        std::thread::sleep(std::time::Duration::from_millis(100));
      }
      self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) {
      if key.starts_with("lecture-progress-") {
        self.progress_writes.fetch_add(1, Ordering::SeqCst);
      }
      self.inner.set(key, value);
    }

    fn remove(&self, key: &str) {
      self.inner.remove(key);
    }

    fn keys(&self) -> Vec<String> {
      self.inner.keys()
    }
  }

  #[test]
  fn concurrent_mastery_submissions_accept_only_one() {
    let store = Arc::new(SlowStore::default());
    let tracker = ProgressTracker::new(store.clone());
    let lecture = lecture();
    let now = Utc::now();
    reflected(&tracker, now);

    let results: Vec<_> = std::thread::scope(|scope| {
      let handles: Vec<_> = (0..2)
        .map(|_| {
          let tracker = tracker.clone();
          let lecture = &lecture;
          scope.spawn(move || tracker.submit_mastery_reflection(lecture, &words(150), &["m1".into()], now))
        })
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
      .iter()
      .any(|r| matches!(r, Err(LecternError::CooldownActive { .. }))));
    assert_eq!(tracker.mastery_history(&lecture.id).attempts().len(), 1);
    assert_eq!(tracker.load(&lecture.id).reflections.mastery.len(), 1);
  }

  #[test]
  fn mastery_submission_writes_progress_once() {
    let store = Arc::new(SlowStore::default());
    let tracker = ProgressTracker::new(store.clone());
    let lecture = lecture();
    let now = Utc::now();
    reflected(&tracker, now);

    let before = store.progress_writes.load(Ordering::SeqCst);
    let (attempt, p) = tracker.submit_mastery_reflection(&lecture, &words(150), &["m1".into()], now).unwrap();
    assert_eq!(store.progress_writes.load(Ordering::SeqCst), before + 1);
    assert_eq!(p.status, ProgressStatus::Mastered);
    assert_eq!(p.reflections.mastery, vec![attempt.id]);
    assert_eq!(tracker.load(&lecture.id), p);
  }
}
