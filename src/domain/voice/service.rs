use super::error::VoiceServiceError;
use super::model::{Gender, PendingVoiceUpload};
use crate::error::AppResult;
use crate::infrastructure::camb::{
    CambApi, CreateVoiceRequest, CreatedVoice, TargetLanguage, VoiceProfile,
};
use crate::infrastructure::pending::PendingUploadStore;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub struct VoiceService {
    api: Arc<dyn CambApi>,
    pending: Arc<dyn PendingUploadStore>,
}

impl VoiceService {
    pub fn new(api: Arc<dyn CambApi>, pending: Arc<dyn PendingUploadStore>) -> Self {
        Self { api, pending }
    }
}

#[async_trait]
pub trait VoiceServiceApi: Send + Sync {
    /// Record a voice-creation request; the reference audio arrives later.
    /// A previous unconsumed request from the same user is overwritten.
    async fn begin_creation(&self, user_id: i64, name: String, gender: Gender, age: i32);

    /// Whether the user has an unconsumed voice-creation request
    async fn has_pending(&self, user_id: i64) -> bool;

    /// Consume the user's pending request and create the voice from the
    /// uploaded reference file. The pending entry is removed whether the
    /// remote call succeeds or fails; a failed attempt starts over with
    /// /createvoice.
    async fn complete_creation(
        &self,
        user_id: i64,
        reference_audio: &Path,
    ) -> Result<CreatedVoice, VoiceServiceError>;

    async fn list_voices(&self) -> AppResult<Vec<VoiceProfile>>;

    async fn list_languages(&self) -> AppResult<Vec<TargetLanguage>>;
}

#[async_trait]
impl VoiceServiceApi for VoiceService {
    async fn begin_creation(&self, user_id: i64, name: String, gender: Gender, age: i32) {
        tracing::info!(user_id, voice_name = %name, age, "Voice creation started, awaiting reference upload");
        self.pending
            .set(user_id, PendingVoiceUpload::new(name, gender, age))
            .await;
    }

    async fn has_pending(&self, user_id: i64) -> bool {
        self.pending.get(user_id).await.is_some()
    }

    async fn complete_creation(
        &self,
        user_id: i64,
        reference_audio: &Path,
    ) -> Result<CreatedVoice, VoiceServiceError> {
        let pending = self
            .pending
            .remove(user_id)
            .await
            .ok_or(VoiceServiceError::NoPendingRequest)?;

        let request = CreateVoiceRequest::new(
            pending.voice_name,
            pending.gender,
            pending.age,
            reference_audio.to_path_buf(),
        );
        let voice = self.api.create_custom_voice(&request).await?;

        tracing::info!(user_id, voice_id = %voice.voice_id, "Custom voice created");
        Ok(voice)
    }

    async fn list_voices(&self) -> AppResult<Vec<VoiceProfile>> {
        self.api.list_voices().await
    }

    async fn list_languages(&self) -> AppResult<Vec<TargetLanguage>> {
        self.api.list_target_languages().await
    }
}
