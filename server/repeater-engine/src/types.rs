//! Core types for the repeater engine (internal models + JSON contracts).

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Tokenizer output
// ---------------------------------------------------------------------------

/// One recognized log line. Borrows its message from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
  pub timestamp: NaiveDateTime,
  pub message: &'a str,
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Talk-group number as printed after "Selecting TG #".
pub type TalkGroupId = u64;

/// TG #0 means "no group selected".
pub const IDLE_TALK_GROUP: TalkGroupId = 0;

/// CTCSS sub-tone frequency in Hz. Equality and hashing are bitwise, so
/// `88.5` and `88.50` are the same key.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct ToneFrequency(pub f64);

impl PartialEq for ToneFrequency {
  fn eq(&self, other: &Self) -> bool {
    self.0.to_bits() == other.0.to_bits()
  }
}

impl Eq for ToneFrequency {}

impl Hash for ToneFrequency {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.0.to_bits().hash(state);
  }
}

// ---------------------------------------------------------------------------
// Event counters
// ---------------------------------------------------------------------------

/// Kinds of counted log events. Declaration order is the serialized key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  TransmitterOn,
  TransmitterOff,
  CtcssDetections,
  TgSelections,
  SquelchOpen,
  SquelchClosed,
  TalkerStart,
  TalkerStop,
  NodesJoined,
  NodesLeft,
  Identifications,
  ReflectorDisconnects,
}

pub type EventCounts = BTreeMap<EventKind, u64>;

// ---------------------------------------------------------------------------
// Finalized sessions
// ---------------------------------------------------------------------------

/// A closed transmitter ON/OFF pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransmissionSession {
  pub start: NaiveDateTime,
  pub end: NaiveDateTime,
  pub duration_seconds: i64,
}

/// A talk-group conversation, from its first non-zero selection to TG #0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QsoSession {
  pub tg: TalkGroupId,
  pub start: NaiveDateTime,
  pub end: NaiveDateTime,
  pub duration_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisconnectionStatus {
  Ongoing,
  Resolved,
}

/// A span during which the reflector link was down, covering `count`
/// consecutive timeout markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectionPeriod {
  pub start: NaiveDateTime,
  pub end: Option<NaiveDateTime>,
  pub duration_seconds: Option<i64>,
  pub count: u64,
  pub status: DisconnectionStatus,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// A total split into clock units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationBreakdown {
  pub hours: i64,
  pub minutes: i64,
  pub seconds: i64,
  pub total_seconds: i64,
}

/// A single duration aggregate with its "Xm Ys" rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStat {
  pub seconds: f64,
  pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransmissionSummary {
  pub carriers_opened: u64,
  pub total_transmissions: usize,
  pub total_time: DurationBreakdown,
  pub average: DurationStat,
  pub min: DurationStat,
  pub max: DurationStat,
  pub sessions: Vec<TransmissionSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneRank {
  pub frequency: ToneFrequency,
  pub count: u64,
  pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneSummary {
  pub total_detections: u64,
  pub unique_tones: usize,
  pub ranking: Vec<ToneRank>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkGroupRank {
  pub tg: TalkGroupId,
  pub count: u64,
  pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkGroupDuration {
  pub tg: TalkGroupId,
  pub total_seconds: i64,
  pub qso_count: u64,
  pub average_seconds: f64,
  pub formatted_total: String,
  pub formatted_average: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TalkGroupSummary {
  pub total_selections: u64,
  pub unique_tgs: usize,
  pub ranking: Vec<TalkGroupRank>,
  /// Ranked by total QSO time, descending.
  pub durations: Vec<TalkGroupDuration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QsoSummary {
  pub total_qso: usize,
  pub total_time: DurationBreakdown,
  pub average: DurationStat,
  pub min: DurationStat,
  pub max: DurationStat,
  pub sessions: Vec<QsoSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisconnectionSummary {
  pub total_periods: usize,
  pub total_disconnections: u64,
  pub total_downtime_seconds: i64,
  pub periods: Vec<DisconnectionPeriod>,
}

/// Everything derived from one parse pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
  pub transmissions: TransmissionSummary,
  pub tones: ToneSummary,
  pub talk_groups: TalkGroupSummary,
  pub qso: QsoSummary,
  pub disconnections: DisconnectionSummary,
  pub events: EventCounts,
}

/// One analyzed log file, keyed by the calendar date in its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
  pub date: Option<NaiveDate>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub filename: Option<String>,
  pub file_size: u64,
  /// blake3 hex digest of the raw input bytes.
  pub source_digest: String,
  pub snapshot: StatisticsSnapshot,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for an input that could not be analyzed.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      path: None,
    }
  }

  pub fn with_path(mut self, path: impl Into<String>) -> Self {
    self.path = Some(path.into());
    self
  }
}
