//! Game configuration.

use crate::coordinator::TurnTiming;
use crate::llm_client::{LlmConfig, LlmProvider};
use crate::session::SessionManager;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use noughts_tictactoe::Mark;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Where opponent moves come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// Ask a language model.
    #[default]
    Llm,
    /// Take the first empty square, no network needed.
    FirstOpen,
}

/// Configuration for a game front end.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameConfig {
    /// The human's mark. The human always moves first.
    #[serde(default = "default_human_mark")]
    human_mark: Mark,

    /// Pause before the opponent is asked for a move, in milliseconds.
    #[serde(default = "default_opponent_delay_ms")]
    opponent_delay_ms: u64,

    /// Oracle timeout in seconds; 0 waits for as long as the transport does.
    #[serde(default = "default_oracle_timeout_secs")]
    oracle_timeout_secs: u64,

    /// Which oracle plays the opponent.
    #[serde(default)]
    oracle: OracleKind,

    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-latest").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Seconds a browser game may sit untouched before it is dropped.
    #[serde(default = "default_session_idle_secs")]
    session_idle_secs: u64,

    /// Most browser games kept at once; the least recently used goes first.
    #[serde(default = "default_max_sessions")]
    max_sessions: usize,
}

fn default_human_mark() -> Mark {
    Mark::X
}

fn default_opponent_delay_ms() -> u64 {
    750
}

fn default_oracle_timeout_secs() -> u64 {
    30
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_session_idle_secs() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    1024
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            human_mark: default_human_mark(),
            opponent_delay_ms: default_opponent_delay_ms(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            oracle: OracleKind::default(),
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            oracle = ?config.oracle,
            human_mark = %config.human_mark,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Timing of opponent turns.
    pub fn timing(&self) -> TurnTiming {
        let timeout = (self.oracle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.oracle_timeout_secs));
        TurnTiming::new(Duration::from_millis(self.opponent_delay_ms), timeout)
    }

    /// Session registry for the browser front end.
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(self.human_mark)
            .with_limits(Duration::from_secs(self.session_idle_secs), self.max_sessions)
    }

    /// Creates LLM configuration from this config.
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY environment variable.
    #[instrument(skip(self), fields(provider = ?self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let var = self.llm_provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
