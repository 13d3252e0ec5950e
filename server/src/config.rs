use crate::logger::{parse_level, LogFormat};
use game_core::Params;
use proto::Codec;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "pong-server.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// Configuration structures
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Simulation cadence, independent of any client frame rate
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Broadcast a snapshot every N ticks
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u32,
    /// Drop clients silent for this long; 0 disables the check
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Create a 2-player session on the fly for unknown match ids
    #[serde(default)]
    pub auto_create_sessions: bool,
    #[serde(default)]
    pub codec: Codec,
    #[serde(default)]
    pub tracing: TracingConfig,
    #[serde(default)]
    pub matches: Vec<MatchConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tick_ms: default_tick_ms(),
            snapshot_every: default_snapshot_every(),
            idle_timeout_secs: default_idle_timeout_secs(),
            auto_create_sessions: false,
            codec: Codec::default(),
            tracing: TracingConfig::default(),
            matches: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tick = self.tick_ms as f64;
        if !(Params::MIN_DT_MS..=Params::MAX_DT_MS).contains(&tick) {
            return Err(ConfigError::Invalid(format!(
                "tick_ms must be within {}..={}, got {}",
                Params::MIN_DT_MS,
                Params::MAX_DT_MS,
                self.tick_ms
            )));
        }
        if self.snapshot_every == 0 {
            return Err(ConfigError::Invalid("snapshot_every must be positive".into()));
        }
        self.tracing.format.parse::<LogFormat>()?;
        parse_level(&self.tracing.level)?;
        for m in &self.matches {
            m.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TracingConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            level: default_level(),
        }
    }
}

/// A session created at startup
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MatchConfig {
    pub id: String,
    #[serde(default = "default_players")]
    pub players: u8,
    pub score_limit: Option<u32>,
    /// Seats filled by the built-in AI once the humans are in
    #[serde(default)]
    pub ai_players: u8,
}

impl MatchConfig {
    pub fn new(id: impl Into<String>, players: u8) -> Self {
        Self {
            id: id.into(),
            players,
            score_limit: None,
            ai_players: 0,
        }
    }

    /// Engine tuning for this match
    pub fn game_config(&self) -> Result<game_core::Config, ConfigError> {
        let config = game_core::Config::for_players(self.players).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "match `{}`: players must be 2 or 4, got {}",
                self.id, self.players
            ))
        })?;
        Ok(match self.score_limit {
            Some(limit) => config.with_score_limit(limit),
            None => config,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Invalid("match id must not be empty".into()));
        }
        self.game_config()?;
        if self.ai_players > self.players {
            return Err(ConfigError::Invalid(format!(
                "match `{}`: ai_players exceeds players",
                self.id
            )));
        }
        if self.score_limit == Some(0) {
            return Err(ConfigError::Invalid(format!(
                "match `{}`: score_limit must be positive",
                self.id
            )));
        }
        Ok(())
    }
}

fn default_bind() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_tick_ms() -> u64 {
    16
}

fn default_snapshot_every() -> u32 {
    1
}

fn default_idle_timeout_secs() -> u64 {
    0
}

fn default_players() -> u8 {
    2
}

fn default_format() -> String {
    "compact".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

pub fn parse_config(contents: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`. A missing file means defaults; a file
/// that exists but does not parse is an error.
pub fn load_config(path: impl AsRef<Path>) -> Result<ServerConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(source) => Err(ConfigError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}
