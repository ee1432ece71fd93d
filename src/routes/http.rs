//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures map to a JSON `{error, message}` body.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::authoring::AuthoredLecture;
use crate::domain::{Lecture, LectureCategory};
use crate::error::LecternError;
use crate::logic::{self, retry_after_secs};
use crate::protocol::*;
use crate::state::AppState;

/// Wraps domain errors for axum; status code follows the error class.
pub struct ApiError(pub LecternError);

impl From<LecternError> for ApiError {
  fn from(e: LecternError) -> Self { ApiError(e) }
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match &self.0 {
      e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
      LecternError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
      LecternError::ReadinessNotPassed
      | LecternError::InvalidTransition { .. }
      | LecternError::NoMasteryAttempt => StatusCode::CONFLICT,
      LecternError::UnknownLecture(_) | LecternError::UnknownAttempt(_) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(target: "lectern", error = %self.0, "Request failed");
    } else {
      warn!(target: "lectern", kind = self.0.kind(), error = %self.0, "Request rejected");
    }
    let body = ErrorOut {
      error: self.0.kind(),
      message: self.0.to_string(),
      retry_after_secs: retry_after_secs(&self.0),
    };
    (status, Json(body)).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_lectures(State(state): State<Arc<AppState>>) -> Json<Vec<LectureSummary>> {
  Json(logic::list_lectures(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lecture(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<Lecture> {
  Ok(Json(state.lecture(&id).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_author_lecture(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AuthorIn>,
) -> ApiResult<AuthoredLecture> {
  let saved = logic::author_lecture(&state, body).await?;
  info!(target: "authoring", id = %saved.lecture.id, category = saved.category.as_str(), "HTTP lecture authored");
  Ok(Json(saved))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_authored(State(state): State<Arc<AppState>>) -> Json<Vec<AuthoredSummary>> {
  Json(logic::list_authored(&state))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_authored_source(
  State(state): State<Arc<AppState>>,
  Path((category, id)): Path<(LectureCategory, String)>,
) -> ApiResult<SourceOut> {
  Ok(Json(logic::authored_source(&state, category, &id)?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<ProgressOut> {
  Ok(Json(logic::get_progress(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_reset_progress(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<ProgressOut> {
  Ok(Json(logic::reset_progress(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_readiness(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<ProgressOut> {
  Ok(Json(logic::start_readiness(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_readiness_draft(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<ResponsesIn> {
  let responses = logic::readiness_draft(&state, &id).await?;
  Ok(Json(ResponsesIn { responses }))
}

#[instrument(level = "info", skip(state, body), fields(answered = body.responses.len()))]
pub async fn http_put_readiness_draft(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ResponsesIn>,
) -> ApiResult<ResponsesIn> {
  logic::save_readiness_draft(&state, &id, &body.responses).await?;
  Ok(Json(body))
}

#[instrument(level = "info", skip(state, body), fields(answered = body.responses.len()))]
pub async fn http_submit_readiness(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ResponsesIn>,
) -> ApiResult<ReadinessOut> {
  let out = logic::submit_readiness(&state, &id, &body.responses).await?;
  info!(target: "progress", lecture = %id, passed = out.result.passed, "HTTP readiness evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_confirm_watch(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<ProgressOut> {
  Ok(Json(logic::confirm_watch(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_submit_initial_reflection(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<TextIn>,
) -> ApiResult<ProgressOut> {
  Ok(Json(logic::submit_initial_reflection(&state, &id, &body.text).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_mastery(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<MasteryOut> {
  Ok(Json(logic::mastery_overview(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), prompts = body.prompt_ids.len()))]
pub async fn http_submit_mastery_reflection(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<MasteryIn>,
) -> ApiResult<AttemptOut> {
  Ok(Json(logic::submit_mastery_reflection(&state, &id, &body.text, &body.prompt_ids).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_attach_feedback(
  State(state): State<Arc<AppState>>,
  Path((id, attempt)): Path<(String, String)>,
  Json(body): Json<FeedbackIn>,
) -> ApiResult<AttemptOut> {
  Ok(Json(logic::attach_feedback(&state, &id, &attempt, &body.feedback).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_set_attempt_status(
  State(state): State<Arc<AppState>>,
  Path((id, attempt)): Path<(String, String)>,
  Json(body): Json<StatusIn>,
) -> ApiResult<AttemptOut> {
  Ok(Json(logic::set_attempt_status(&state, &id, &attempt, body.status).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_attempt_prompt(
  State(state): State<Arc<AppState>>,
  Path((id, attempt)): Path<(String, String)>,
) -> ApiResult<PromptOut> {
  Ok(Json(logic::attempt_prompt(&state, &id, &attempt).await?))
}
