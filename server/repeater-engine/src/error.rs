//! Structured error types for the repeater engine.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// The line matched the timestamp grammar but the calendar value is invalid.
  #[error("timestamp: line {line}: {text:?}: {reason}")]
  Timestamp {
    line: usize,
    text: String,
    reason: String,
  },

  #[error("io: {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("read: {0}")]
  Read(#[from] std::io::Error),

  #[error("config: {0}")]
  Config(String),

  #[error("config: {0}")]
  ConfigToml(#[from] toml::de::Error),
}

impl EngineError {
  pub fn timestamp(line: usize, text: &str, reason: impl Into<String>) -> Self {
    Self::Timestamp {
      line,
      text: text.to_string(),
      reason: reason.into(),
    }
  }

  pub fn io(path: &Path, source: std::io::Error) -> Self {
    Self::Io {
      path: path.display().to_string(),
      source,
    }
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }
}
