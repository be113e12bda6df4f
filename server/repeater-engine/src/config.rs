//! Engine configuration with sane defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

/// Tunable thresholds and snapshot sample sizes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// QSOs shorter than this (seconds) are treated as TG bounces and dropped.
  pub min_qso_seconds: i64,
  /// Entries kept in the CTCSS tone ranking.
  pub top_tones: usize,
  /// Entries kept in the talk-group ranking.
  pub top_talk_groups: usize,
  /// Transmission sessions echoed in the snapshot.
  pub transmission_sample: usize,
  /// QSO sessions echoed in the snapshot.
  pub qso_sample: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      min_qso_seconds: 3,
      top_tones: 10,
      top_talk_groups: 10,
      transmission_sample: 50,
      qso_sample: 20,
    }
  }
}

impl Config {
  /// Load a TOML file. Keys it does not name keep their defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    Self::from_toml(&raw)
  }

  pub fn from_toml(raw: &str) -> Result<Self, EngineError> {
    let config: Config = toml::from_str(raw)?;
    if config.min_qso_seconds < 0 {
      return Err(EngineError::config("min_qso_seconds must not be negative"));
    }
    Ok(config)
  }
}
