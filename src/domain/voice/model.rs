use std::path::PathBuf;

/// Gender codes used by the Camb AI voice endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the chat token ("m"/"f", case-insensitive)
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "m" => Some(Gender::Male),
            "f" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Numeric code expected on the wire
    pub fn code(&self) -> i32 {
        match self {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }
}

/// Per-user transient record between `/createvoice` and the reference upload
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVoiceUpload {
    pub voice_name: String,
    pub gender: Gender,
    pub age: i32,
    pub file_path: Option<PathBuf>,
}

impl PendingVoiceUpload {
    pub fn new(voice_name: String, gender: Gender, age: i32) -> Self {
        Self {
            voice_name,
            gender,
            age,
            file_path: None,
        }
    }
}
