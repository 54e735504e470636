//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{config_path, default_log_dir};
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Notification webhook settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Stage log settings
    #[serde(default)]
    pub logs: LogConfig,

    /// Full regression pipeline settings
    #[serde(default)]
    pub sequence: SequenceConfig,

    /// Per-stage overrides keyed by stage name
    #[serde(default)]
    pub stages: HashMap<String, StageOverride>,
}

/// Notification endpoint settings
#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Set to false to silence notifications entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Webhook URL. Notifications are skipped when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Channel the message is posted to
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Display name of the sender
    #[serde(default = "default_sender")]
    pub sender: String,

    /// Per-request timeout
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: None,
            channel: default_channel(),
            sender: default_sender(),
            timeout_secs: default_notify_timeout(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_channel() -> String {
    "sds-homestore".to_string()
}
fn default_sender() -> String {
    "regression-bot".to_string()
}
fn default_notify_timeout() -> u64 {
    10
}

/// Stage log settings
#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Directory holding one log file per captured stage
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

/// Pipeline settings for the `sequence` mode
#[derive(Debug, Deserialize)]
pub struct SequenceConfig {
    /// Stage names, run in order
    #[serde(default = "default_sequence_stages")]
    pub stages: Vec<String>,

    /// Pause between consecutive stages, so the previous test process
    /// releases its devices before the next one opens them
    #[serde(default = "default_settle")]
    pub settle_secs: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            stages: default_sequence_stages(),
            settle_secs: default_settle(),
        }
    }
}

impl SequenceConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

fn default_sequence_stages() -> Vec<String> {
    vec!["normal".into(), "load".into(), "mapping".into()]
}
fn default_settle() -> u64 {
    5
}

/// Override for a built-in stage definition
///
/// `args` and `pass_marker` only apply to output-captured stages; the
/// recovery stage honors `executable` alone.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StageOverride {
    /// Executable name, resolved against `--dirpath`
    pub executable: Option<String>,

    /// Replacement argument list
    pub args: Option<Vec<String>>,

    /// Replacement pass marker
    pub pass_marker: Option<String>,

    /// Log file name inside the log directory
    pub log_file: Option<String>,
}

impl Config {
    /// Load configuration from an explicit path, or the default config file
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every run pass
    fn validate(&self) -> Result<()> {
        for (name, ovr) in &self.stages {
            if let Some(marker) = &ovr.pass_marker {
                if marker.trim().is_empty() {
                    return Err(super::Error::Config(format!(
                        "[stages.{name}] pass_marker must not be empty"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Get the override for a stage, if any
    pub fn stage_override(&self, name: &str) -> Option<&StageOverride> {
        self.stages.get(name)
    }
}
