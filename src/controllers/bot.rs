use crate::domain::tts::TtsServiceApi;
use crate::domain::voice::{Gender, VoiceServiceApi, VoiceServiceError};
use crate::error::AppError;
use crate::infrastructure::camb::TtsRequest;
use crate::infrastructure::telegram::{Attachment, ChatTransport, Message, Update};
use crate::infrastructure::tempfile::TempAudio;
use std::sync::Arc;

const START_TEXT: &str = "Hi! Use /createvoice <name> <gender> <age> to create a voice. \
    Gender can be \"m\" for Male or \"f\" for Female. Then upload the reference file.";
const CREATEVOICE_USAGE: &str = "Usage: /createvoice <name> <gender> <age>. \
    Gender can be \"m\" for Male or \"f\" for Female.";
const VOICE_USAGE: &str = "Usage: /voice \"<text>\" <voice_id> <language> <gender> <age>";

/// Routes inbound chat updates to the voice and TTS services and relays
/// results back through the transport.
pub struct BotController {
    voice_service: Arc<dyn VoiceServiceApi>,
    tts_service: Arc<dyn TtsServiceApi>,
    transport: Arc<dyn ChatTransport>,
}

impl BotController {
    pub fn new(
        voice_service: Arc<dyn VoiceServiceApi>,
        tts_service: Arc<dyn TtsServiceApi>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            voice_service,
            tts_service,
            transport,
        }
    }

    /// Handle one update end to end. All failures are reported to the
    /// requester here; nothing propagates to the polling loop.
    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };

        if let Some(text) = message.text.clone() {
            if text.starts_with('/') {
                self.handle_command(&message, &text).await;
                return;
            }
        }

        if let Some(attachment) = message.attachment().cloned() {
            self.handle_file_upload(&message, &attachment).await;
        }
    }

    async fn handle_command(&self, message: &Message, text: &str) {
        let chat_id = message.chat.id;
        // Commands in groups arrive as /command@botname
        let command = text
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("");

        match command {
            "/start" | "/help" => self.reply(chat_id, START_TEXT).await,
            "/createvoice" => self.handle_create_voice(message, text).await,
            "/voice" => self.handle_voice(chat_id, text).await,
            "/listvoices" => self.handle_list_voices(chat_id).await,
            "/listlanguages" => self.handle_list_languages(chat_id).await,
            other => {
                tracing::debug!(command = other, "Ignoring unknown command");
            }
        }
    }

    /// /createvoice <name> <m|f> <age> — records the request; the voice is
    /// actually created once the reference file arrives.
    async fn handle_create_voice(&self, message: &Message, text: &str) {
        let chat_id = message.chat.id;
        let Some(user_id) = message.from.as_ref().map(|u| u.id) else {
            return;
        };

        let args = split_args(text);
        if args.len() < 4 {
            self.reply(chat_id, CREATEVOICE_USAGE).await;
            return;
        }

        let name = args[1].clone();
        let Some(gender) = Gender::parse(&args[2]) else {
            self.reply(chat_id, "Invalid gender. Use \"m\" for Male or \"f\" for Female.")
                .await;
            return;
        };
        let Ok(age) = args[3].parse::<i32>() else {
            self.reply(chat_id, "Invalid age. Use a whole number.").await;
            return;
        };

        self.voice_service
            .begin_creation(user_id, name, gender, age)
            .await;
        self.reply(chat_id, "Please upload the reference file now.")
            .await;
    }

    async fn handle_file_upload(&self, message: &Message, attachment: &Attachment) {
        let chat_id = message.chat.id;
        let Some(user_id) = message.from.as_ref().map(|u| u.id) else {
            return;
        };

        if !self.voice_service.has_pending(user_id).await {
            self.reply(chat_id, "Please use the /createvoice command first.")
                .await;
            return;
        }

        // Scoped: the reference audio is deleted on every exit path.
        let temp = TempAudio::new("ogg");
        if let Err(e) = self
            .transport
            .download_file(&attachment.file_id, temp.path())
            .await
        {
            self.report_error(chat_id, e, "Failed to create voice. Please try again later.")
                .await;
            return;
        }

        match self
            .voice_service
            .complete_creation(user_id, temp.path())
            .await
        {
            Ok(voice) => {
                self.reply(
                    chat_id,
                    &format!("Voice created successfully! Voice ID: {}", voice.voice_id),
                )
                .await;
            }
            Err(VoiceServiceError::NoPendingRequest) => {
                self.reply(chat_id, "Please use the /createvoice command first.")
                    .await;
            }
            Err(VoiceServiceError::App(e)) => {
                self.report_error(chat_id, e, "Failed to create voice. Please try again later.")
                    .await;
            }
        }
    }

    /// /voice "<text>" <voice_id> <language> <gender> <age>
    async fn handle_voice(&self, chat_id: i64, text: &str) {
        let request = match parse_voice_args(text) {
            Ok(request) => request,
            Err(e) => {
                self.report_error(chat_id, e, VOICE_USAGE).await;
                return;
            }
        };

        if let Err(e) = self.generate_voice(chat_id, &request).await {
            self.report_error(chat_id, e, "Failed to generate voice. Please try again later.")
                .await;
        }
    }

    /// Submit, poll to completion, drain the audio to a scoped temp file and
    /// send it as a voice message.
    async fn generate_voice(&self, chat_id: i64, request: &TtsRequest) -> Result<(), AppError> {
        let task_id = self.tts_service.submit(request).await?;

        // Presence indicator while the task cooks; losing it is not fatal.
        if let Err(e) = self.transport.send_recording_action(chat_id).await {
            tracing::warn!(error = %e, chat_id, "Failed to send recording action");
        }

        let stream = self.tts_service.await_result(&task_id).await?;

        let temp = TempAudio::new("wav");
        temp.fill_from_stream(stream).await?;
        self.transport.send_voice(chat_id, temp.path()).await?;
        Ok(())
    }

    async fn handle_list_voices(&self, chat_id: i64) {
        match self.voice_service.list_voices().await {
            Ok(voices) => {
                let mut message = String::from("Available Voices:\n");
                for voice in voices {
                    message.push_str(&format!("ID: {}, Name: {}\n", voice.id, voice.voice_name));
                }
                self.reply(chat_id, &message).await;
            }
            Err(e) => {
                self.report_error(chat_id, e, "Failed to fetch voices. Please try again later.")
                    .await;
            }
        }
    }

    async fn handle_list_languages(&self, chat_id: i64) {
        match self.voice_service.list_languages().await {
            Ok(languages) => {
                let mut message = String::from("Available Languages:\n");
                for lang in languages {
                    message.push_str(&format!("ID: {}, Name: {}\n", lang.id, lang.language_name));
                }
                self.reply(chat_id, &message).await;
            }
            Err(e) => {
                self.report_error(chat_id, e, "Failed to fetch languages. Please try again later.")
                    .await;
            }
        }
    }

    /// Log the failure in full, reply with either the corrective message
    /// (local preconditions, timeout) or the command's generic fallback.
    async fn report_error(&self, chat_id: i64, err: AppError, fallback: &str) {
        if err.is_local_precondition() {
            tracing::warn!(error = %err, chat_id, "Rejected request");
            self.reply(chat_id, &err.user_message()).await;
        } else {
            tracing::error!(error = %err, chat_id, "Command failed");
            let message = match err {
                AppError::TaskTimeout { .. } => err.user_message(),
                _ => fallback.to_string(),
            };
            self.reply(chat_id, &message).await;
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text).await {
            tracing::warn!(error = %e, chat_id, "Failed to send reply");
        }
    }
}

/// Split a command line into arguments, honoring double quotes so
/// `/voice "Hello world" 7 ...` keeps the text as one argument.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

fn parse_voice_args(text: &str) -> Result<TtsRequest, AppError> {
    let args = split_args(text);
    if args.len() < 6 {
        return Err(AppError::BadRequest(VOICE_USAGE.to_string()));
    }

    Ok(TtsRequest {
        text: args[1].clone(),
        voice_id: parse_int(&args[2], "voice_id")?,
        language: parse_int(&args[3], "language")?,
        gender: parse_int(&args[4], "gender")?,
        age: parse_int(&args[5], "age")?,
    })
}

fn parse_int<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", what, value)))
}
