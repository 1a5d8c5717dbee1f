use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voiceclip_bot::controllers::BotController;
use voiceclip_bot::domain::tts::{PollPolicy, TtsService};
use voiceclip_bot::domain::voice::VoiceService;
use voiceclip_bot::infrastructure::camb::CambAiClient;
use voiceclip_bot::infrastructure::config::{Config, LogFormat};
use voiceclip_bot::infrastructure::pending::InMemoryPendingUploadStore;
use voiceclip_bot::infrastructure::telegram::TelegramTransport;

const LONG_POLL_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(base_url = %config.camb_base_url, "Starting VoiceClip Bot");

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate the remote service client and stores
    let camb_client = Arc::new(CambAiClient::new(
        config.camb_base_url.clone(),
        config.camb_api_key.clone(),
    ));
    let pending_store = Arc::new(InMemoryPendingUploadStore::new());

    // 2. Instantiate the chat transport
    let transport = Arc::new(TelegramTransport::new(config.telegram_bot_token.clone()));

    // 3. Instantiate services (inject client and store)
    let voice_service = Arc::new(VoiceService::new(
        camb_client.clone(),
        pending_store.clone(),
    ));
    let tts_service = Arc::new(TtsService::new(
        camb_client.clone(),
        PollPolicy::from_config(&config),
    ));

    // 4. Instantiate the controller (inject services and transport)
    let controller = Arc::new(BotController::new(
        voice_service,
        tts_service,
        transport.clone(),
    ));

    tracing::info!("Bot initialized, entering long-poll loop");

    // Long-poll loop: one spawned task per inbound update, so a slow TTS
    // poll sequence never blocks other conversations.
    let mut offset: i64 = 0;
    loop {
        match transport.get_updates(offset, LONG_POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        controller.handle_update(update).await;
                    });
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "getUpdates failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voiceclip_bot=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voiceclip_bot=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
