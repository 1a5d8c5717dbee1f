use crate::error::{AppError, AppResult};
use crate::infrastructure::camb::{AudioStream, CambApi, TtsRequest};
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Bound on the status-poll loop. The remote task lifecycle gives no upper
/// bound of its own, so a stuck task would otherwise poll forever.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.tts_poll_interval(),
            max_attempts: config.tts_poll_max_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
        }
    }
}

pub struct TtsService {
    api: Arc<dyn CambApi>,
    policy: PollPolicy,
}

impl TtsService {
    pub fn new(api: Arc<dyn CambApi>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Submit a synthesis job; returns the task id to await.
    /// Submission failures propagate immediately, with no retry.
    async fn submit(&self, request: &TtsRequest) -> AppResult<String>;

    /// Drive a submitted task to completion and return the audio stream.
    ///
    /// Polls the task status at the configured interval until SUCCESS, then
    /// fetches the result exactly once. A terminal failure state fails fast;
    /// exhausting the attempt budget fails with `AppError::TaskTimeout`.
    async fn await_result(&self, task_id: &str) -> AppResult<AudioStream>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn submit(&self, request: &TtsRequest) -> AppResult<String> {
        tracing::info!(
            voice_id = request.voice_id,
            language = request.language,
            gender = request.gender,
            age = request.age,
            text_length = request.text.len(),
            "Submitting TTS task"
        );

        let submission = self.api.create_tts(request).await?;

        tracing::info!(task_id = %submission.task_id, "TTS task submitted");
        Ok(submission.task_id)
    }

    async fn await_result(&self, task_id: &str) -> AppResult<AudioStream> {
        for attempt in 1..=self.policy.max_attempts {
            let response = self.api.get_tts_status(task_id).await?;

            if response.status.is_success() {
                let run_id = response.run_id.ok_or_else(|| {
                    AppError::Internal(format!("task {} succeeded without a run_id", task_id))
                })?;

                tracing::info!(
                    task_id,
                    run_id = %run_id,
                    attempts = attempt,
                    "TTS task completed, fetching result"
                );
                return self.api.get_tts_result(&run_id).await;
            }

            if response.status.is_terminal_failure() {
                tracing::error!(task_id, status = ?response.status, "TTS task failed remotely");
                return Err(AppError::TaskFailed {
                    task_id: task_id.to_string(),
                    status: response.status,
                });
            }

            tracing::debug!(task_id, attempt, status = ?response.status, "TTS task still running");
            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        tracing::error!(
            task_id,
            attempts = self.policy.max_attempts,
            "TTS task did not complete within the poll budget"
        );
        Err(AppError::TaskTimeout {
            attempts: self.policy.max_attempts,
        })
    }
}
