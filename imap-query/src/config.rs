use crate::error::{MailError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub maildir: MaildirConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How fetched messages are treated when a query leaves the fetch mode unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultFetch {
    /// Read messages without touching the \Seen flag
    #[default]
    Peek,
    /// Set \Seen on every fetched message
    MarkAsRead,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptionsConfig {
    #[serde(default)]
    pub fetch: DefaultFetch,
    #[serde(default = "default_true")]
    pub fetch_body: bool,
    #[serde(default = "default_true")]
    pub fetch_attachments: bool,
    #[serde(default)]
    pub charset: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaildirConfig {
    pub root: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_true() -> bool {
    true
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            fetch: DefaultFetch::Peek,
            fetch_body: true,
            fetch_attachments: true,
            charset: None,
        }
    }
}

impl Default for MaildirConfig {
    fn default() -> Self {
        Self {
            root: "/var/mail".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MailError::Config(e.to_string()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MailError::Config(e.to_string()))
    }

    pub fn default() -> Self {
        Self {
            options: OptionsConfig::default(),
            maildir: MaildirConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
