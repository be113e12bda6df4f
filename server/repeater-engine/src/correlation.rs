//! Stateful correlation tracks.
//!
//! Each track is a small state machine advanced by the engine in log order.
//! Tracks never fail: an event that does not fit the current state (OFF with
//! nothing keyed, TG #0 with no QSO open) is a no-op, since logs routinely
//! start mid-session.

use chrono::NaiveDateTime;

use crate::types::{
  DisconnectionPeriod, DisconnectionStatus, QsoSession, TalkGroupId, TransmissionSession,
  IDLE_TALK_GROUP,
};

/// Whole seconds from `start` to `end`, clamped at zero.
fn elapsed_seconds(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
  (end - start).num_seconds().max(0)
}

// ---------------------------------------------------------------------------
// Transmitter: IDLE <-> KEYED
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TransmitterTrack {
  keyed_since: Option<NaiveDateTime>,
}

impl TransmitterTrack {
  /// Transmitter ON. Opens a session only when idle; returns whether it did.
  pub fn key_on(&mut self, at: NaiveDateTime) -> bool {
    if self.keyed_since.is_some() {
      return false;
    }
    self.keyed_since = Some(at);
    true
  }

  /// Transmitter OFF. Closes the open session, if any.
  pub fn key_off(&mut self, at: NaiveDateTime) -> Option<TransmissionSession> {
    let start = self.keyed_since.take()?;
    Some(TransmissionSession {
      start,
      end: at,
      duration_seconds: elapsed_seconds(start, at),
    })
  }

  pub fn is_keyed(&self) -> bool {
    self.keyed_since.is_some()
  }
}

// ---------------------------------------------------------------------------
// Talk group / QSO: IDLE <-> TG_ACTIVE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct OpenQso {
  tg: TalkGroupId,
  start: NaiveDateTime,
}

/// What a TG selection did to the QSO track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QsoStep {
  /// A non-zero TG opened a QSO.
  Opened,
  /// A non-zero TG arrived while a QSO was open; only the attribution changed.
  Retargeted,
  /// TG #0 closed a QSO long enough to keep.
  Closed(QsoSession),
  /// TG #0 closed a QSO below the minimum duration.
  Discarded { tg: TalkGroupId, duration_seconds: i64 },
  /// TG #0 with nothing open.
  Idle,
}

#[derive(Debug, Clone)]
pub struct QsoTrack {
  open: Option<OpenQso>,
  min_duration_seconds: i64,
}

impl QsoTrack {
  pub fn new(min_duration_seconds: i64) -> Self {
    Self {
      open: None,
      min_duration_seconds,
    }
  }

  /// Apply a "Selecting TG #n" event.
  pub fn select(&mut self, tg: TalkGroupId, at: NaiveDateTime) -> QsoStep {
    if tg != IDLE_TALK_GROUP {
      return match &mut self.open {
        Some(open) => {
          open.tg = tg;
          QsoStep::Retargeted
        }
        None => {
          self.open = Some(OpenQso { tg, start: at });
          QsoStep::Opened
        }
      };
    }

    let Some(open) = self.open.take() else {
      return QsoStep::Idle;
    };
    let duration_seconds = (at - open.start).num_seconds();
    if duration_seconds < self.min_duration_seconds {
      return QsoStep::Discarded {
        tg: open.tg,
        duration_seconds,
      };
    }
    QsoStep::Closed(QsoSession {
      tg: open.tg,
      start: open.start,
      end: at,
      duration_seconds,
    })
  }

  /// Talk group the open QSO is currently attributed to.
  pub fn active_tg(&self) -> Option<TalkGroupId> {
    self.open.map(|o| o.tg)
  }
}

// ---------------------------------------------------------------------------
// Reflector disconnection: NONE <-> OPEN
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct OpenOutage {
  start: NaiveDateTime,
  last: NaiveDateTime,
  count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DisconnectionTrack {
  open: Option<OpenOutage>,
}

impl DisconnectionTrack {
  /// A "Disconnected ... Connection timed out" marker. Consecutive markers
  /// coalesce into the open period.
  pub fn timeout(&mut self, at: NaiveDateTime) {
    match &mut self.open {
      Some(open) => {
        open.count += 1;
        open.last = at;
      }
      None => {
        self.open = Some(OpenOutage {
          start: at,
          last: at,
          count: 1,
        });
      }
    }
  }

  /// A node joined or left: the link is evidently back.
  pub fn reconnect(&mut self, at: NaiveDateTime) -> Option<DisconnectionPeriod> {
    self.open.take().map(|open| resolved(open, at))
  }

  /// End of input: close at the last marker seen, not at the final line.
  pub fn flush(&mut self) -> Option<DisconnectionPeriod> {
    self.open.take().map(|open| resolved(open, open.last))
  }

  /// The open period as it stands, without closing it.
  pub fn ongoing(&self) -> Option<DisconnectionPeriod> {
    self.open.map(|open| DisconnectionPeriod {
      start: open.start,
      end: None,
      duration_seconds: None,
      count: open.count,
      status: DisconnectionStatus::Ongoing,
    })
  }
}

fn resolved(open: OpenOutage, end: NaiveDateTime) -> DisconnectionPeriod {
  DisconnectionPeriod {
    start: open.start,
    end: Some(end),
    duration_seconds: Some(elapsed_seconds(open.start, end)),
    count: open.count,
    status: DisconnectionStatus::Resolved,
  }
}
