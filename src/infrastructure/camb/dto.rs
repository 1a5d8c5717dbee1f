use crate::domain::voice::Gender;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A target language as listed by GET /target_languages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetLanguage {
    pub id: i64,
    #[serde(rename = "language")]
    pub language_name: String,
}

/// A voice as listed by GET /list-voices. Owned by the remote service; only
/// referenced here by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub id: i64,
    pub voice_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// Parameters for POST /create-custom-voice
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVoiceRequest {
    pub voice_name: String,
    pub gender: Gender,
    pub age: i32,
    pub file_path: PathBuf,
    pub description: Option<String>,
    pub language: Option<String>,
    pub is_published: bool,
    pub enhance_audio: bool,
}

impl CreateVoiceRequest {
    pub fn new(voice_name: String, gender: Gender, age: i32, file_path: PathBuf) -> Self {
        Self {
            voice_name,
            gender,
            age,
            file_path,
            description: None,
            language: None,
            is_published: false,
            // Enhancement of the reference audio is on by default; it
            // measurably improves cloning accuracy.
            enhance_audio: true,
        }
    }
}

/// Response of POST /create-custom-voice
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedVoice {
    pub voice_id: String,
}

/// Body of POST /tts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: i64,
    pub language: i64,
    pub gender: i32,
    pub age: i32,
}

/// Response of POST /tts
#[derive(Debug, Clone, Deserialize)]
pub struct TtsSubmission {
    pub task_id: String,
}

/// Remote-defined task states. Unknown strings deserialize to `Unknown` and
/// are treated as still-running so new remote states do not break parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
    Error,
    Timeout,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Success)
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            TaskStatus::Failed | TaskStatus::Error | TaskStatus::Timeout
        )
    }
}

/// Identifier of a completed run. The API is not consistent about whether
/// this arrives as a number or a string, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunId::Int(id) => write!(f, "{}", id),
            RunId::Str(id) => write!(f, "{}", id),
        }
    }
}

/// Response of GET /tts/{task_id}; `run_id` is present only once the task
/// has reached SUCCESS.
#[derive(Debug, Clone, Deserialize)]
pub struct TtsStatusResponse {
    pub status: TaskStatus,
    #[serde(default)]
    pub run_id: Option<RunId>,
}
