use edugpt_core::{
    instructor::HistoryWindow,
    llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL, LlmConfig},
    translation::DEFAULT_TRANSLATE_API_BASE,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub api_key: String,
    pub api_base: String,
    pub chat_model: String,
    pub log_level: Level,
    pub prompts_path: Option<PathBuf>,
    pub progress_path: PathBuf,
    pub history_window: HistoryWindow,
    pub typing_delay: Duration,
    pub translate_api_base: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENROUTER_API_KEY".to_string()))?;

        let api_base =
            std::env::var("LLM_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);
        let progress_path = std::env::var("PROGRESS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("progress.json"));

        let history_window = match std::env::var("HISTORY_WINDOW") {
            Ok(value) if !value.trim().is_empty() && !value.eq_ignore_ascii_case("none") => {
                let turns = value.trim().parse::<usize>().map_err(|e| {
                    ConfigError::InvalidValue("HISTORY_WINDOW".to_string(), e.to_string())
                })?;
                if turns == 0 {
                    return Err(ConfigError::InvalidValue(
                        "HISTORY_WINDOW".to_string(),
                        "must be at least 1, or \"none\" for the full history".to_string(),
                    ));
                }
                HistoryWindow::LastTurns(turns)
            }
            _ => HistoryWindow::Unbounded,
        };

        let typing_delay_ms = match std::env::var("TYPING_DELAY_MS") {
            Ok(value) => value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("TYPING_DELAY_MS".to_string(), e.to_string())
            })?,
            Err(_) => 50,
        };

        let translate_api_base = std::env::var("TRANSLATE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_TRANSLATE_API_BASE.to_string());

        Ok(Self {
            bind_address,
            api_key,
            api_base,
            chat_model,
            log_level,
            prompts_path,
            progress_path,
            history_window,
            typing_delay: Duration::from_millis(typing_delay_ms),
            translate_api_base,
        })
    }

    /// The settings the core LLM client is built from.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: Some(self.api_key.clone()),
            api_base: self.api_base.clone(),
            model: self.chat_model.clone(),
        }
    }
}
