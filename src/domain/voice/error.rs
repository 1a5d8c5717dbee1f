use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum VoiceServiceError {
    /// The user uploaded a file without issuing /createvoice first.
    #[error("no pending voice creation for this user")]
    NoPendingRequest,

    #[error(transparent)]
    App(#[from] AppError),
}
