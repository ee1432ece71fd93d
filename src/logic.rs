//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! Each function resolves the lecture, stamps the wall-clock time, calls the
//! tracker or authoring, and shapes the result into protocol DTOs.

use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::LectureCategory;
use crate::error::{LecternError, Result};
use crate::evaluation::evaluation_prompt;
use crate::history::Verdict;
use crate::protocol::*;
use crate::reflection::cooldown_remaining;
use crate::state::AppState;
use std::collections::BTreeMap;

fn to_progress_out(state: &AppState, progress: crate::progress::LectureProgress) -> ProgressOut {
  let watched = state.tracker.watched(&progress.lecture_id);
  let mastery_passed = state.tracker.mastery_history(&progress.lecture_id).any_passed();
  ProgressOut { progress, watched, mastery_passed }
}

/// Retry hint for cooldown errors, in whole seconds.
pub fn retry_after_secs(err: &LecternError) -> Option<i64> {
  match err {
    LecternError::CooldownActive { remaining } => Some(remaining.num_seconds().max(1)),
    _ => None,
  }
}

pub async fn list_lectures(state: &AppState) -> Vec<LectureSummary> {
  let catalog = state.catalog.read().await;
  catalog.in_order().into_iter().map(LectureSummary::from).collect()
}

#[instrument(level = "info", skip(state, body), fields(lecture = %body.lecture.id))]
pub async fn author_lecture(state: &AppState, body: AuthorIn) -> Result<crate::authoring::AuthoredLecture> {
  let saved = state.authoring.save(body.lecture, body.category)?;
  state.catalog.write().await.insert(saved.lecture.clone());
  Ok(saved)
}

pub fn list_authored(state: &AppState) -> Vec<AuthoredSummary> {
  state
    .authoring
    .entries()
    .into_iter()
    .map(|e| AuthoredSummary { id: e.lecture.id, title: e.lecture.title, category: e.category })
    .collect()
}

/// Exported TOML block for an authored lecture.
pub fn authored_source(state: &AppState, category: LectureCategory, id: &str) -> Result<SourceOut> {
  state
    .authoring
    .source(category, id)
    .map(|source| SourceOut { source })
    .ok_or_else(|| LecternError::UnknownLecture(id.to_string()))
}

pub async fn get_progress(state: &AppState, lecture_id: &str) -> Result<ProgressOut> {
  state.lecture(lecture_id).await?;
  Ok(to_progress_out(state, state.tracker.load(lecture_id)))
}

pub async fn start_readiness(state: &AppState, lecture_id: &str) -> Result<ProgressOut> {
  state.lecture(lecture_id).await?;
  let progress = state.tracker.start_readiness(lecture_id, Utc::now())?;
  Ok(to_progress_out(state, progress))
}

pub async fn readiness_draft(state: &AppState, lecture_id: &str) -> Result<BTreeMap<String, String>> {
  state.lecture(lecture_id).await?;
  Ok(state.tracker.readiness_draft(lecture_id))
}

pub async fn save_readiness_draft(state: &AppState, lecture_id: &str, responses: &BTreeMap<String, String>) -> Result<()> {
  state.lecture(lecture_id).await?;
  state.tracker.save_readiness_draft(lecture_id, responses)
}

#[instrument(level = "info", skip(state, responses), fields(%lecture_id, answered = responses.len()))]
pub async fn submit_readiness(state: &AppState, lecture_id: &str, responses: &BTreeMap<String, String>) -> Result<ReadinessOut> {
  let lecture = state.lecture(lecture_id).await?;
  let report = state.tracker.submit_readiness(&lecture, responses, Utc::now())?;
  let message = report.outcome.message();
  Ok(ReadinessOut {
    result: report.result,
    outcome: report.outcome,
    message,
    progress: to_progress_out(state, report.progress),
  })
}

pub async fn confirm_watch(state: &AppState, lecture_id: &str) -> Result<ProgressOut> {
  state.lecture(lecture_id).await?;
  let progress = state.tracker.confirm_watch(lecture_id, Utc::now())?;
  Ok(to_progress_out(state, progress))
}

pub async fn submit_initial_reflection(state: &AppState, lecture_id: &str, text: &str) -> Result<ProgressOut> {
  state.lecture(lecture_id).await?;
  let progress = state.tracker.submit_initial_reflection(lecture_id, text, Utc::now())?;
  Ok(to_progress_out(state, progress))
}

pub async fn mastery_overview(state: &AppState, lecture_id: &str) -> Result<MasteryOut> {
  state.lecture(lecture_id).await?;
  let history = state.tracker.mastery_history(lecture_id);
  let remaining = cooldown_remaining(&history, Utc::now());
  Ok(MasteryOut {
    attempts: history.attempts().to_vec(),
    can_submit: remaining.is_none(),
    cooldown_remaining_secs: remaining.map(|d| d.num_seconds()),
  })
}

#[instrument(level = "info", skip(state, text, prompt_ids), fields(%lecture_id, text_len = text.len(), prompts = prompt_ids.len()))]
pub async fn submit_mastery_reflection(state: &AppState, lecture_id: &str, text: &str, prompt_ids: &[String]) -> Result<AttemptOut> {
  let lecture = state.lecture(lecture_id).await?;
  let (attempt, progress) = state.tracker.submit_mastery_reflection(&lecture, text, prompt_ids, Utc::now())?;
  info!(target: "progress", %lecture_id, attempt = %attempt.id, "Mastery attempt awaiting manual evaluation");
  Ok(AttemptOut { attempt, progress: Some(to_progress_out(state, progress)) })
}

pub async fn attach_feedback(state: &AppState, lecture_id: &str, attempt_id: &str, feedback: &str) -> Result<AttemptOut> {
  state.lecture(lecture_id).await?;
  let attempt = state.tracker.attach_feedback(lecture_id, attempt_id, feedback)?;
  Ok(AttemptOut { attempt, progress: None })
}

pub async fn set_attempt_status(state: &AppState, lecture_id: &str, attempt_id: &str, verdict: Verdict) -> Result<AttemptOut> {
  state.lecture(lecture_id).await?;
  let attempt = state.tracker.set_attempt_status(lecture_id, attempt_id, verdict)?;
  Ok(AttemptOut { attempt, progress: Some(to_progress_out(state, state.tracker.load(lecture_id))) })
}

pub async fn attempt_prompt(state: &AppState, lecture_id: &str, attempt_id: &str) -> Result<PromptOut> {
  let lecture = state.lecture(lecture_id).await?;
  let history = state.tracker.mastery_history(lecture_id);
  let attempt = history
    .get(attempt_id)
    .ok_or_else(|| LecternError::UnknownAttempt(attempt_id.to_string()))?;
  Ok(PromptOut { text: evaluation_prompt(&state.evaluation, &lecture, attempt) })
}

pub async fn reset_progress(state: &AppState, lecture_id: &str) -> Result<ProgressOut> {
  state.lecture(lecture_id).await?;
  let progress = state.tracker.reset(lecture_id);
  Ok(to_progress_out(state, progress))
}
