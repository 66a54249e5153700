//! Server and client configuration files.
//!
//! Both are JSON objects. Every field is required; the first missing one
//! is reported by name, in the order the fields are listed here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use trivia_questions::QuestionProvider;
use trivia_round::{RoundConfig, Templates};

/// Errors that can occur while loading a configuration file.
///
/// The messages are the diagnostics printed by the binaries.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration not provided")]
    NotProvided,

    #[error("File {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error loading config: {0}")]
    Read(#[source] std::io::Error),

    #[error("Invalid JSON in config file")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Missing required field '{0}' in config")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

const SERVER_FIELDS: &[&str] = &[
    "port",
    "players",
    "question_types",
    "question_formats",
    "question_seconds",
    "question_interval_seconds",
    "ready_info",
    "question_word",
    "correct_answer",
    "incorrect_answer",
    "points_noun_singular",
    "points_noun_plural",
    "final_standings_heading",
    "one_winner",
    "multiple_winners",
];

const CLIENT_FIELDS: &[&str] = &["username", "client_mode"];

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Contents of the server's `--config` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port to listen on, on all interfaces. 0 picks a free port.
    pub port: u16,

    /// Number of players the session waits for.
    pub players: usize,

    /// One round per entry, in order.
    pub question_types: Vec<String>,

    /// Display template per question type, with one `{}` slot.
    pub question_formats: HashMap<String, String>,

    /// Answer window per round. Also sent to clients as `time_limit`.
    pub question_seconds: u64,

    /// Pause after READY and between rounds.
    pub question_interval_seconds: f64,

    #[serde(flatten)]
    pub templates: Templates,
}

impl ServerConfig {
    /// Reads and parses the file at `path`.
    ///
    /// `None` means no path was given on the command line.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let text = read(path)?;
        Self::from_json(&text)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        parse_required(text, SERVER_FIELDS)
    }

    /// Checks the values against each other and against the question
    /// provider that will serve the session.
    pub fn validate<Q: QuestionProvider + ?Sized>(&self, provider: &Q) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(invalid("players", "must be at least 1"));
        }
        if self.question_types.is_empty() {
            return Err(invalid("question_types", "must list at least one question type"));
        }
        if !self.question_interval_seconds.is_finite() || self.question_interval_seconds < 0.0 {
            return Err(invalid(
                "question_interval_seconds",
                "must be a non-negative number",
            ));
        }
        for question_type in &self.question_types {
            if !provider.supports(question_type) {
                return Err(invalid(
                    "question_types",
                    format!("unknown question type {question_type:?}"),
                ));
            }
            if !self.question_formats.contains_key(question_type) {
                return Err(invalid(
                    "question_formats",
                    format!("no format for {question_type:?}"),
                ));
            }
        }
        Ok(())
    }

    /// The round engine's view of this configuration.
    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            question_types: self.question_types.clone(),
            question_formats: self.question_formats.clone(),
            time_limit: Duration::from_secs(self.question_seconds),
            interval: Duration::from_secs_f64(self.question_interval_seconds),
            templates: self.templates.clone(),
            ..RoundConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// How the client answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Read each answer from stdin within the time limit.
    You,
    /// Solve each question locally.
    Auto,
}

/// Contents of the client's `--config` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub username: String,
    pub client_mode: ClientMode,
}

impl ClientConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let text = read(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        parse_required(text, CLIENT_FIELDS)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read(path: Option<&Path>) -> Result<String, ConfigError> {
    let path = path.ok_or(ConfigError::NotProvided)?;
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(ConfigError::Read)
}

/// Parses `text` as a JSON object, checks `required` in order, then
/// deserializes.
fn parse_required<T: DeserializeOwned>(
    text: &str,
    required: &[&'static str],
) -> Result<T, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(ConfigError::InvalidJson)?;
    let Some(object) = value.as_object() else {
        return Err(invalid("config", "expected a JSON object"));
    };
    if let Some(missing) = required.iter().find(|field| !object.contains_key(**field)) {
        return Err(ConfigError::MissingField(*missing));
    }
    serde_json::from_value(value).map_err(|e| invalid("config", e.to_string()))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}
