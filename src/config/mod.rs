//! Configuration management for the completion engine
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Upper bound accepted for the interactive completion delay.
const MAX_AUTO_COMPLETE_DELAY_MS: u64 = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion engine behaviour
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo REPL configuration
    #[serde(default)]
    pub repl: ReplConfig,
}

/// Options recognised by the completion engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionConfig {
    /// Keep the info panel state between two popups
    #[serde(default = "default_remember_info_visibility")]
    pub remember_info_visibility: bool,

    /// Select the first proposal when the popup appears
    #[serde(default = "default_select_on_show")]
    pub select_on_show: bool,

    /// Show a header row per provider when several providers take part
    #[serde(default = "default_show_headers")]
    pub show_headers: bool,

    /// Delay between an edit and the interactive completion request
    #[serde(default = "default_auto_complete_delay_ms")]
    pub auto_complete_delay_ms: u64,

    /// Number of rows moved by page up / page down
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Demo REPL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Words offered by the keyword provider
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Shortest word remembered by the buffer words provider
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,
}

// Default value functions
fn default_remember_info_visibility() -> bool {
    true
}

fn default_select_on_show() -> bool {
    true
}

fn default_show_headers() -> bool {
    true
}

fn default_auto_complete_delay_ms() -> u64 {
    250
}

fn default_page_size() -> usize {
    5
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

fn default_keywords() -> Vec<String> {
    [
        "break", "continue", "else", "enum", "fn", "for", "if", "impl", "let", "loop", "match",
        "mod", "pub", "return", "struct", "trait", "use", "where", "while",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_min_word_length() -> usize {
    3
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            remember_info_visibility: default_remember_info_visibility(),
            select_on_show: default_select_on_show(),
            show_headers: default_show_headers(),
            auto_complete_delay_ms: default_auto_complete_delay_ms(),
            page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            min_word_length: default_min_word_length(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file, falling back to defaults
    ///
    /// With `None` the default path is used. A missing file is not an error:
    /// the defaults are returned instead.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.completion-engine/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".completion-engine")
            .join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_with_comments()?)?;
        Ok(())
    }

    /// Render the configuration as TOML with a short header
    pub fn to_toml_with_comments(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!(
            "# completion-engine configuration\n# Location: {}\n\n{}",
            Self::default_config_path().display(),
            body
        ))
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.completion.auto_complete_delay_ms > MAX_AUTO_COMPLETE_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                field: "completion.auto_complete_delay_ms".to_string(),
                value: self.completion.auto_complete_delay_ms.to_string(),
            }
            .into());
        }

        if self.completion.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "completion.page_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if self.repl.min_word_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "repl.min_word_length".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl CompletionConfig {
    /// Get the interactive completion delay as Duration
    pub fn auto_complete_delay(&self) -> Duration {
        Duration::from_millis(self.auto_complete_delay_ms)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
