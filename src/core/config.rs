//! Sink configuration
//!
//! The only configuration the pipeline consumes: which kind of sink, where it
//! delivers, and its starting threshold. Deserializable from JSON so front ends
//! can keep it in a file.

use super::error::{DispatchError, Result};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    File,
    #[serde(alias = "socket")]
    Network,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::File => f.write_str("file"),
            SinkKind::Network => f.write_str("network"),
        }
    }
}

/// Settings for [`create_sink`](crate::sinks::create_sink)
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::{LogLevel, SinkConfig, SinkKind};
///
/// let config = SinkConfig::from_json(
///     r#"{ "kind": "network", "target": "127.0.0.1", "port": 5140, "level": "ERROR" }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.kind, SinkKind::Network);
/// assert_eq!(config.level, LogLevel::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// File path, or host name / address for network sinks
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub level: LogLevel,
}

impl SinkConfig {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: SinkKind::File,
            target: path.into(),
            port: None,
            level: LogLevel::default(),
        }
    }

    pub fn network(host: impl Into<String>, port: u16) -> Self {
        Self {
            kind: SinkKind::Network,
            target: host.into(),
            port: Some(port),
            level: LogLevel::default(),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: SinkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(DispatchError::config("SinkConfig", "target must not be empty"));
        }
        if self.kind == SinkKind::Network {
            match self.port {
                None => {
                    return Err(DispatchError::config(
                        "SinkConfig",
                        "network sink requires a port",
                    ))
                }
                Some(0) => {
                    return Err(DispatchError::config("SinkConfig", "port must be 1-65535"))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
