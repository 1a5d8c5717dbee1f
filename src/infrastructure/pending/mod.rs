use crate::domain::voice::PendingVoiceUpload;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Store for per-user pending voice-creation requests.
/// Abstracts the backing storage so it can be swapped for a persistent one;
/// implementations must serialize concurrent writers for the same user.
#[async_trait]
pub trait PendingUploadStore: Send + Sync {
    async fn get(&self, user_id: i64) -> Option<PendingVoiceUpload>;

    async fn set(&self, user_id: i64, pending: PendingVoiceUpload);

    /// Remove and return the entry, consuming the pending request.
    async fn remove(&self, user_id: i64) -> Option<PendingVoiceUpload>;
}

/// In-memory implementation backed by a RwLock'd map
#[derive(Default)]
pub struct InMemoryPendingUploadStore {
    entries: RwLock<HashMap<i64, PendingVoiceUpload>>,
}

impl InMemoryPendingUploadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingUploadStore for InMemoryPendingUploadStore {
    async fn get(&self, user_id: i64) -> Option<PendingVoiceUpload> {
        self.entries.read().await.get(&user_id).cloned()
    }

    async fn set(&self, user_id: i64, pending: PendingVoiceUpload) {
        self.entries.write().await.insert(user_id, pending);
    }

    async fn remove(&self, user_id: i64) -> Option<PendingVoiceUpload> {
        self.entries.write().await.remove(&user_id)
    }
}
