use super::dto::{
    CreateVoiceRequest, CreatedVoice, RunId, TargetLanguage, TtsRequest, TtsStatusResponse,
    TtsSubmission, VoiceProfile,
};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;

// Canonical endpoint paths. The remote API has historically served both
// hyphenated and underscored variants of some of these; the hyphenated set
// is the one used here (see DESIGN.md).
const TARGET_LANGUAGES_PATH: &str = "/target_languages";
const CREATE_CUSTOM_VOICE_PATH: &str = "/create-custom-voice";
const LIST_VOICES_PATH: &str = "/list-voices";
const TTS_PATH: &str = "/tts";
const TTS_RESULT_PATH: &str = "/tts-result";

const API_KEY_HEADER: &str = "x-api-key";

/// Lazy chunked audio payload; must be fully drained by the caller.
pub type AudioStream = Pin<Box<dyn Stream<Item = AppResult<Bytes>> + Send>>;

/// Remote TTS service operations.
/// Abstracts the Camb AI HTTP API so the domain services can be exercised
/// against an in-process double in tests.
///
/// None of these operations retry; every call is attempted exactly once and
/// any non-2xx response surfaces as `AppError::RemoteService`.
#[async_trait]
pub trait CambApi: Send + Sync {
    async fn list_target_languages(&self) -> AppResult<Vec<TargetLanguage>>;

    async fn list_voices(&self) -> AppResult<Vec<VoiceProfile>>;

    /// Clone a custom voice from a local reference audio file.
    ///
    /// Fails with `AppError::FileNotFound` before any network I/O when the
    /// reference file does not exist.
    async fn create_custom_voice(&self, request: &CreateVoiceRequest) -> AppResult<CreatedVoice>;

    /// Submit a synthesis job; returns the task handle to poll.
    async fn create_tts(&self, request: &TtsRequest) -> AppResult<TtsSubmission>;

    async fn get_tts_status(&self, task_id: &str) -> AppResult<TtsStatusResponse>;

    /// Fetch the finished audio for a successful run as a byte stream.
    async fn get_tts_result(&self, run_id: &RunId) -> AppResult<AudioStream>;
}

/// reqwest-backed client for the Camb AI API
pub struct CambAiClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl CambAiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map any non-2xx response to a uniform remote-service error carrying
    /// the status code and response body.
    async fn check(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(AppError::RemoteService {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CambApi for CambAiClient {
    async fn list_target_languages(&self) -> AppResult<Vec<TargetLanguage>> {
        self.get_json(TARGET_LANGUAGES_PATH).await
    }

    async fn list_voices(&self) -> AppResult<Vec<VoiceProfile>> {
        self.get_json(LIST_VOICES_PATH).await
    }

    async fn create_custom_voice(&self, request: &CreateVoiceRequest) -> AppResult<CreatedVoice> {
        // Local precondition: validate before any network I/O.
        if !request.file_path.exists() {
            return Err(AppError::FileNotFound(
                request.file_path.display().to_string(),
            ));
        }

        let file_name = request
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference.ogg".to_string());
        let file_bytes = tokio::fs::read(&request.file_path).await?;

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(file_bytes).file_name(file_name),
            )
            .text("voice_name", request.voice_name.clone())
            .text("gender", request.gender.code().to_string())
            .text("age", request.age.to_string());

        if let Some(description) = &request.description {
            form = form.text("description", description.clone());
        }
        if let Some(language) = &request.language {
            form = form.text("language", language.clone());
        }
        if request.is_published {
            form = form.text("is_published", "true");
        }
        if request.enhance_audio {
            form = form.text("enhance_audio", "true");
        }

        tracing::info!(
            voice_name = %request.voice_name,
            gender = request.gender.code(),
            age = request.age,
            file = %request.file_path.display(),
            "Creating custom voice"
        );

        let response = self
            .http_client
            .post(self.url(CREATE_CUSTOM_VOICE_PATH))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;

        Self::check(response)
            .await?
            .json::<CreatedVoice>()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse created voice: {}", e)))
    }

    async fn create_tts(&self, request: &TtsRequest) -> AppResult<TtsSubmission> {
        let response = self
            .http_client
            .post(self.url(TTS_PATH))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::check(response)
            .await?
            .json::<TtsSubmission>()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse TTS submission: {}", e)))
    }

    async fn get_tts_status(&self, task_id: &str) -> AppResult<TtsStatusResponse> {
        self.get_json(&format!("{}/{}", TTS_PATH, task_id)).await
    }

    async fn get_tts_result(&self, run_id: &RunId) -> AppResult<AudioStream> {
        let response = self
            .http_client
            .get(self.url(&format!("{}/{}", TTS_RESULT_PATH, run_id)))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let stream = Self::check(response).await?.bytes_stream().map(|chunk| {
            chunk.map_err(|e| AppError::Transport(format!("TTS result stream failed: {}", e)))
        });

        Ok(Box::pin(stream))
    }
}
