//! Core engine: owns one parse pass, feeds lines through the tracks in order.

use std::io::Read;
use std::path::Path;

use tracing::{debug, trace};

use crate::config::Config;
use crate::correlation::{DisconnectionTrack, QsoStep, QsoTrack, TransmitterTrack};
use crate::error::EngineError;
use crate::events::{self, Signal};
use crate::stats;
use crate::tally::Tally;
use crate::tokenizer;
use crate::types::*;

/// Everything accumulated by one pass. Reset at the start of every parse.
#[derive(Debug, Clone, Default)]
pub struct PassState {
  pub transmissions: Vec<TransmissionSession>,
  /// Running sum of `transmissions[..].duration_seconds`.
  pub total_transmission_seconds: i64,
  /// Every ON marker, including re-entrant ones that open no session.
  pub carriers_opened: u64,
  pub qsos: Vec<QsoSession>,
  pub tones: Tally<ToneFrequency>,
  /// Non-zero TG selections only.
  pub talk_groups: Tally<TalkGroupId>,
  pub disconnections: Vec<DisconnectionPeriod>,
  pub events: EventCounts,
  pub lines_read: usize,
  pub lines_matched: usize,
}

/// The repeater log correlation engine. One instance per input at a time.
pub struct Engine {
  config: Config,
  pass: PassState,
  transmitter: TransmitterTrack,
  qso: QsoTrack,
  disconnection: DisconnectionTrack,
  signals: Vec<Signal>,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    let qso = QsoTrack::new(config.min_qso_seconds);
    Self {
      config,
      pass: PassState::default(),
      transmitter: TransmitterTrack::default(),
      qso,
      disconnection: DisconnectionTrack::default(),
      signals: Vec::new(),
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// State accumulated by the last pass (or the one in progress).
  pub fn pass(&self) -> &PassState {
    &self.pass
  }

  /// Drop all state, as if freshly constructed.
  pub fn reset(&mut self) {
    self.pass = PassState::default();
    self.transmitter = TransmitterTrack::default();
    self.qso = QsoTrack::new(self.config.min_qso_seconds);
    self.disconnection = DisconnectionTrack::default();
  }

  /// Parse a complete log held in memory.
  ///
  /// On error the engine is left reset; no partial pass is observable.
  pub fn parse_str(&mut self, input: &str) -> Result<StatisticsSnapshot, EngineError> {
    self.reset();
    debug!(bytes = input.len(), "pass started");
    for (idx, raw) in input.lines().enumerate() {
      self.pass.lines_read += 1;
      let line = match tokenizer::tokenize(raw, idx + 1) {
        Ok(Some(line)) => line,
        Ok(None) => continue,
        Err(e) => {
          self.reset();
          return Err(e);
        }
      };
      self.feed(&line);
    }
    self.finish();

    debug!(
      lines = self.pass.lines_read,
      matched = self.pass.lines_matched,
      transmissions = self.pass.transmissions.len(),
      qsos = self.pass.qsos.len(),
      disconnections = self.pass.disconnections.len(),
      "pass complete"
    );
    Ok(self.snapshot())
  }

  /// Parse raw bytes; invalid UTF-8 sequences are replaced, not rejected.
  pub fn parse_bytes(&mut self, input: &[u8]) -> Result<StatisticsSnapshot, EngineError> {
    self.parse_str(&String::from_utf8_lossy(input))
  }

  pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<StatisticsSnapshot, EngineError> {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf) {
      self.reset();
      return Err(EngineError::Read(e));
    }
    self.parse_bytes(&buf)
  }

  pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<StatisticsSnapshot, EngineError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading log file");
    let buf = match std::fs::read(path) {
      Ok(buf) => buf,
      Err(e) => {
        self.reset();
        return Err(EngineError::io(path, e));
      }
    };
    self.parse_bytes(&buf)
  }

  /// Apply one tokenized line to every track it concerns.
  ///
  /// Lines must arrive in log order. Call [`Engine::finish`] after the last one.
  pub fn feed(&mut self, line: &LogLine<'_>) {
    let at = line.timestamp;
    self.pass.lines_matched += 1;

    let mut signals = std::mem::take(&mut self.signals);
    signals.clear();
    events::classify(line.message, &mut signals);

    for &signal in &signals {
      *self.pass.events.entry(signal.event_kind()).or_insert(0) += 1;

      match signal {
        Signal::Tone(freq) => {
          self.pass.tones.increment(freq);
        }
        Signal::TalkGroup(tg) => {
          if tg != IDLE_TALK_GROUP {
            self.pass.talk_groups.increment(tg);
          }
          match self.qso.select(tg, at) {
            QsoStep::Closed(session) => {
              trace!(tg = session.tg, duration = session.duration_seconds, "qso closed");
              self.pass.qsos.push(session);
            }
            QsoStep::Discarded { tg, duration_seconds } => {
              trace!(tg, duration = duration_seconds, "qso below minimum, discarded");
            }
            QsoStep::Opened | QsoStep::Retargeted | QsoStep::Idle => {}
          }
        }
        Signal::TransmitterOn => {
          self.pass.carriers_opened += 1;
          self.transmitter.key_on(at);
        }
        Signal::TransmitterOff => {
          if let Some(session) = self.transmitter.key_off(at) {
            trace!(duration = session.duration_seconds, "transmission closed");
            self.pass.total_transmission_seconds += session.duration_seconds;
            self.pass.transmissions.push(session);
          }
        }
        Signal::ReflectorTimeout => self.disconnection.timeout(at),
        Signal::NodeJoined | Signal::NodeLeft => {
          if let Some(period) = self.disconnection.reconnect(at) {
            trace!(count = period.count, "disconnection resolved by node event");
            self.pass.disconnections.push(period);
          }
        }
        Signal::TalkGroupOutOfRange => {
          trace!("talk group id out of range, counted but not tracked");
        }
        Signal::SquelchOpen
        | Signal::SquelchClosed
        | Signal::TalkerStart
        | Signal::TalkerStop
        | Signal::Identification => {}
      }
    }

    self.signals = signals;
  }

  /// End of input: close a still-open disconnection at its last marker.
  pub fn finish(&mut self) {
    if let Some(period) = self.disconnection.flush() {
      trace!(count = period.count, "disconnection closed at end of input");
      self.pass.disconnections.push(period);
    }
  }

  /// The disconnection currently open, if any (only meaningful mid-pass).
  pub fn disconnection_in_progress(&self) -> Option<DisconnectionPeriod> {
    self.disconnection.ongoing()
  }

  /// Recompute the statistics for the current pass state.
  pub fn snapshot(&self) -> StatisticsSnapshot {
    stats::reduce(&self.pass, &self.config)
  }
}
