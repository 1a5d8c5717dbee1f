use super::api::{ApiResponse, FileInfo, Update};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Outbound half of the chat collaborator: everything the command router
/// needs to talk back to a conversation.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()>;

    /// Send a local audio file as a voice message
    async fn send_voice(&self, chat_id: i64, audio_path: &Path) -> AppResult<()>;

    /// Show the "recording a voice message" presence indicator
    async fn send_recording_action(&self, chat_id: i64) -> AppResult<()>;

    /// Download an inbound attachment to a local path
    async fn download_file(&self, file_id: &str, dest: &Path) -> AppResult<()>;
}

/// Telegram Bot API client (long polling)
pub struct TelegramTransport {
    base_url: String,
    token: String,
    http_client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(token: String) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE.to_string(), token)
    }

    pub fn with_base_url(base_url: String, token: String) -> Self {
        Self {
            base_url,
            token,
            http_client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

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

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> AppResult<T> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;

        let envelope: ApiResponse<T> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to parse {} response: {}", method, e)))?;

        if !envelope.ok {
            return Err(AppError::RemoteService {
                status: 200,
                body: envelope
                    .description
                    .unwrap_or_else(|| format!("{} returned ok=false", method)),
            });
        }
        envelope
            .result
            .ok_or_else(|| AppError::Transport(format!("{} returned no result", method)))
    }

    /// Long-poll for the next batch of updates. `offset` must be one past
    /// the highest update id already handled.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> AppResult<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": timeout_secs }),
        )
        .await
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn send_voice(&self, chat_id: i64, audio_path: &Path) -> AppResult<()> {
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voice_message.wav".to_string());
        let audio_bytes = tokio::fs::read(audio_path).await?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part(
                "voice",
                reqwest::multipart::Part::bytes(audio_bytes).file_name(file_name),
            );

        let response = self
            .http_client
            .post(self.method_url("sendVoice"))
            .multipart(form)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn send_recording_action(&self, chat_id: i64) -> AppResult<()> {
        let _: bool = self
            .call(
                "sendChatAction",
                json!({ "chat_id": chat_id, "action": "record_voice" }),
            )
            .await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> AppResult<()> {
        let info: FileInfo = self
            .call("getFile", json!({ "file_id": file_id }))
            .await?;
        let file_path = info.file_path.ok_or_else(|| {
            AppError::Transport(format!("getFile returned no path for {}", file_id))
        })?;

        let url = format!("{}/file/bot{}/{}", self.base_url, self.token, file_path);
        let response = self.http_client.get(&url).send().await?;
        let mut stream = Self::check(response).await?.bytes_stream();

        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| AppError::Transport(format!("File download failed: {}", e)))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(file_id, dest = %dest.display(), "Attachment downloaded");
        Ok(())
    }
}
