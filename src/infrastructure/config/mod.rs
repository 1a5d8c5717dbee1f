use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub camb_api_key: String,
    pub camb_base_url: String,
    pub telegram_bot_token: String,
    pub log_format: LogFormat,
    // TTS polling policy
    pub tts_poll_interval_ms: u64,
    pub tts_poll_max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            camb_api_key: env::var("CAMB_AI_API_KEY")?,
            camb_base_url: env::var("CAMB_AI_BASE_URL")
                .unwrap_or_else(|_| "https://api.camb.ai/apis".to_string()),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            tts_poll_interval_ms: env::var("TTS_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            tts_poll_max_attempts: env::var("TTS_POLL_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn tts_poll_interval(&self) -> Duration {
        Duration::from_millis(self.tts_poll_interval_ms)
    }
}
