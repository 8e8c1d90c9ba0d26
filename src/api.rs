use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::{AnswerWrite, ApiEnvelope, Attempt, ExamPaper};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("cannot decode server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server response carried no data")]
    MissingData,
    #[error("exam paper is not a computer-based test")]
    NotCbt,
}

/// Everything needed to open an attempt in one round trip: the attempt
/// record (with saved responses) and its paper (with questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptBundle {
    pub attempt: Attempt,
    pub exam_paper: ExamPaper,
}

/// The backend surface the attempt flow needs. Implemented over HTTP for
/// the real server and in-memory for tests.
pub trait ExamApi {
    fn start_attempt(&self, exam_paper_id: &str) -> Result<AttemptBundle, ApiError>;
    fn fetch_attempt(&self, attempt_id: &str) -> Result<AttemptBundle, ApiError>;
    fn save_answers(&self, attempt_id: &str, writes: &[AnswerWrite]) -> Result<(), ApiError>;
    fn submit_attempt(&self, attempt_id: &str, idempotency_key: &str) -> Result<(), ApiError>;
}

pub struct HttpExamApi {
    client: Client,
    base_url: String,
    token: String,
    school_id: String,
}

impl HttpExamApi {
    pub fn new(
        base_url: &str,
        token: &str,
        school_id: &str,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            school_id: school_id.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Unwraps the `{success, message, data}` envelope, requiring data.
    fn unwrap_data<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let envelope: ApiEnvelope<T> = Self::read_envelope(response)?;
        envelope.data.ok_or(ApiError::MissingData)
    }

    /// Same envelope check for endpoints whose data we do not use.
    fn check_ok(response: Response) -> Result<(), ApiError> {
        Self::read_envelope::<Value>(response).map(|_| ())
    }

    fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiEnvelope<T>, ApiError> {
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            let message = if envelope.message.is_empty() {
                "unknown error".to_string()
            } else {
                envelope.message
            };
            return Err(ApiError::Rejected(message));
        }
        Ok(envelope)
    }
}

impl ExamApi for HttpExamApi {
    fn start_attempt(&self, exam_paper_id: &str) -> Result<AttemptBundle, ApiError> {
        let response = self
            .client
            .post(self.url("/exam/cbt/attempts/start"))
            .bearer_auth(&self.token)
            .json(&json!({
                "examPaperId": exam_paper_id,
                "schoolId": self.school_id,
            }))
            .send()?;
        Self::unwrap_data(response)
    }

    fn fetch_attempt(&self, attempt_id: &str) -> Result<AttemptBundle, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/exam/cbt/attempts/{}", attempt_id)))
            .bearer_auth(&self.token)
            .send()?;
        Self::unwrap_data(response)
    }

    fn save_answers(&self, attempt_id: &str, writes: &[AnswerWrite]) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/exam/cbt/attempts/{}/responses", attempt_id)))
            .bearer_auth(&self.token)
            .json(&json!({ "responses": writes }))
            .send()?;
        Self::check_ok(response)
    }

    fn submit_attempt(&self, attempt_id: &str, idempotency_key: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/exam/cbt/attempts/{}/submit", attempt_id)))
            .bearer_auth(&self.token)
            .header("Idempotency-Key", idempotency_key)
            .send()?;
        Self::check_ok(response)
    }
}

/// Best-effort message out of an error body that may not be the envelope.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Deterministic per-attempt key: a resubmission of the same attempt
/// presents the same key, so the server can collapse duplicates.
pub fn submit_idempotency_key(attempt_id: &str, started_at: &DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(attempt_id.as_bytes());
    hasher.update(started_at.to_rfc3339().as_bytes());
    let result = hasher.finalize();
    hex_encode(&result)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
