pub mod service;

pub use service::{PollPolicy, TtsService, TtsServiceApi};
