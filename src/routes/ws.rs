//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::LecternError;
use crate::logic::{self, retry_after_secs};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "lectern", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "lectern", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "lectern", msg = %trunc_for_log(&txt, 200), "WS received");
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error {
            error: "invalid_json",
            message: format!("Invalid JSON: {}", e),
            retry_after_secs: None,
          },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "error": "serialize", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "lectern", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "lectern", "WebSocket disconnected");
}

fn error_reply(err: LecternError) -> ServerWsMessage {
  ServerWsMessage::Error { error: err.kind(), message: err.to_string(), retry_after_secs: retry_after_secs(&err) }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  let reply = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,

    ClientWsMessage::GetProgress { lecture_id } =>
      logic::get_progress(state, &lecture_id).await.map(|progress| ServerWsMessage::Progress { progress }),

    ClientWsMessage::StartReadiness { lecture_id } =>
      logic::start_readiness(state, &lecture_id).await.map(|progress| ServerWsMessage::Progress { progress }),

    ClientWsMessage::SubmitReadiness { lecture_id, responses } => {
      let out = logic::submit_readiness(state, &lecture_id, &responses).await;
      if let Ok(r) = &out {
        info!(target: "progress", lecture = %lecture_id, passed = r.result.passed, "WS readiness evaluated");
      }
      out.map(|readiness| ServerWsMessage::Readiness { readiness })
    }

    ClientWsMessage::ConfirmWatch { lecture_id } =>
      logic::confirm_watch(state, &lecture_id).await.map(|progress| ServerWsMessage::Progress { progress }),

    ClientWsMessage::SubmitInitialReflection { lecture_id, text } =>
      logic::submit_initial_reflection(state, &lecture_id, &text)
        .await
        .map(|progress| ServerWsMessage::Progress { progress }),

    ClientWsMessage::SubmitMasteryReflection { lecture_id, text, prompt_ids } =>
      logic::submit_mastery_reflection(state, &lecture_id, &text, &prompt_ids)
        .await
        .map(|attempt| ServerWsMessage::Attempt { attempt }),

    ClientWsMessage::AttachFeedback { lecture_id, attempt_id, feedback } =>
      logic::attach_feedback(state, &lecture_id, &attempt_id, &feedback)
        .await
        .map(|attempt| ServerWsMessage::Attempt { attempt }),

    ClientWsMessage::SetAttemptStatus { lecture_id, attempt_id, status } =>
      logic::set_attempt_status(state, &lecture_id, &attempt_id, status)
        .await
        .map(|attempt| ServerWsMessage::Attempt { attempt }),

    ClientWsMessage::ResetProgress { lecture_id } =>
      logic::reset_progress(state, &lecture_id).await.map(|progress| ServerWsMessage::Progress { progress }),
  };
  reply.unwrap_or_else(error_reply)
}
