use crate::infrastructure::camb::TaskStatus;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The remote API answered with a non-2xx status.
    #[error("Remote service error ({status}): {body}")]
    RemoteService { status: u16, body: String },

    /// The HTTP call itself failed (connect, TLS, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Audio file not found at: {0}")]
    FileNotFound(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("TTS task did not complete after {attempts} status checks")]
    TaskTimeout { attempts: u32 },

    #[error("TTS task {task_id} ended in state {status:?}")]
    TaskFailed { task_id: String, status: TaskStatus },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this failure was caused by the requester's own input and can
    /// be fixed by them, as opposed to a remote or infrastructure failure.
    pub fn is_local_precondition(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::BadRequest(_))
    }

    /// Message safe to show the requester. Local precondition errors carry a
    /// corrective hint; everything else collapses to a generic message so no
    /// remote detail leaks into the chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::FileNotFound(_) | Self::BadRequest(_) => self.to_string(),
            Self::TaskTimeout { .. } => {
                "Voice generation took too long. Please try again later.".to_string()
            }
            _ => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
