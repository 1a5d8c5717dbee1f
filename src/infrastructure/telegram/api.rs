use serde::Deserialize;

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Attachment>,
    pub audio: Option<Attachment>,
    pub voice: Option<Attachment>,
}

impl Message {
    /// The first attached binary, whichever slot Telegram delivered it in
    pub fn attachment(&self) -> Option<&Attachment> {
        self.document
            .as_ref()
            .or(self.audio.as_ref())
            .or(self.voice.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub file_id: String,
    pub file_unique_id: String,
}

/// Result of getFile; `file_path` addresses the download endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub file_id: String,
    pub file_path: Option<String>,
}
