//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Lecture, LectureCategory};
use crate::history::{ReflectionAttempt, Verdict};
use crate::progress::LectureProgress;
use crate::readiness::{ReadinessOutcome, ReadinessResult};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetProgress {
        #[serde(rename = "lectureId")]
        lecture_id: String,
    },
    StartReadiness {
        #[serde(rename = "lectureId")]
        lecture_id: String,
    },
    SubmitReadiness {
        #[serde(rename = "lectureId")]
        lecture_id: String,
        responses: BTreeMap<String, String>,
    },
    ConfirmWatch {
        #[serde(rename = "lectureId")]
        lecture_id: String,
    },
    SubmitInitialReflection {
        #[serde(rename = "lectureId")]
        lecture_id: String,
        text: String,
    },
    SubmitMasteryReflection {
        #[serde(rename = "lectureId")]
        lecture_id: String,
        text: String,
        #[serde(rename = "promptIds", default)]
        prompt_ids: Vec<String>,
    },
    AttachFeedback {
        #[serde(rename = "lectureId")]
        lecture_id: String,
        #[serde(rename = "attemptId")]
        attempt_id: String,
        feedback: String,
    },
    SetAttemptStatus {
        #[serde(rename = "lectureId")]
        lecture_id: String,
        #[serde(rename = "attemptId")]
        attempt_id: String,
        status: Verdict,
    },
    ResetProgress {
        #[serde(rename = "lectureId")]
        lecture_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Progress {
        progress: ProgressOut,
    },
    Readiness {
        readiness: ReadinessOut,
    },
    Attempt {
        attempt: AttemptOut,
    },
    Error {
        error: &'static str,
        message: String,
        #[serde(rename = "retryAfterSecs", skip_serializing_if = "Option::is_none")]
        retry_after_secs: Option<i64>,
    },
}

/// Stored progress plus derived flags the UI needs.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    #[serde(flatten)]
    pub progress: LectureProgress,
    pub watched: bool,
    /// Any mastery attempt marked passed. Independent of `status == mastered`.
    pub mastery_passed: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessOut {
    pub result: ReadinessResult,
    pub outcome: ReadinessOutcome,
    pub message: String,
    pub progress: ProgressOut,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOut {
    pub attempt: ReflectionAttempt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressOut>,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct LectureSummary {
    pub id: String,
    pub title: String,
    pub prerequisites: Vec<String>,
}

impl From<&Lecture> for LectureSummary {
    fn from(l: &Lecture) -> Self {
        Self { id: l.id.clone(), title: l.title.clone(), prerequisites: l.prerequisites.clone() }
    }
}

#[derive(Serialize)]
pub struct AuthoredSummary {
    pub id: String,
    pub title: String,
    pub category: LectureCategory,
}

#[derive(Serialize)]
pub struct SourceOut {
    pub source: String,
}

#[derive(Deserialize)]
pub struct AuthorIn {
    #[serde(default)]
    pub category: LectureCategory,
    pub lecture: Lecture,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResponsesIn {
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct TextIn {
    pub text: String,
}

#[derive(Deserialize)]
pub struct MasteryIn {
    pub text: String,
    #[serde(rename = "promptIds", default)]
    pub prompt_ids: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryOut {
    pub attempts: Vec<ReflectionAttempt>,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining_secs: Option<i64>,
}

#[derive(Deserialize)]
pub struct FeedbackIn {
    pub feedback: String,
}

#[derive(Deserialize)]
pub struct StatusIn {
    pub status: Verdict,
}

#[derive(Serialize)]
pub struct PromptOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<i64>,
}
