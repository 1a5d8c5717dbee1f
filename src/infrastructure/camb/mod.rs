pub mod client;
pub mod dto;

pub use client::{AudioStream, CambAiClient, CambApi};
pub use dto::{
    CreateVoiceRequest, CreatedVoice, RunId, TargetLanguage, TaskStatus, TtsRequest,
    TtsStatusResponse, TtsSubmission, VoiceProfile,
};
