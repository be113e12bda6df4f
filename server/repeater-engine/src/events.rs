//! Message classification: which correlation signals a log message carries.
//!
//! Patterns are independent substring matches; one message may raise several
//! signals. Signals are pushed in a fixed order (tone, TG, transmitter, other
//! counters, reflector), which is the order the engine applies them.

use crate::types::{EventKind, TalkGroupId, ToneFrequency};

const CTCSS_SUFFIX: &str = " Hz CTCSS tone detected";
const TG_PREFIX: &str = "Selecting TG #";
const TX_ON: &str = "Turning the transmitter ON";
const TX_OFF: &str = "Turning the transmitter OFF";
const SQUELCH_OPEN: &str = "squelch is OPEN";
const SQUELCH_CLOSED: &str = "squelch is CLOSED";
const TALKER_START: &str = "Talker start";
const TALKER_STOP: &str = "Talker stop";
const NODE_JOINED: &str = "Node joined";
const NODE_LEFT: &str = "Node left";
const IDENTIFICATION: &str = "identification";
const REFLECTOR_DISCONNECTED: &str = "ReflectorLogic: Disconnected from";
const CONNECTION_TIMED_OUT: &str = "Connection timed out";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
  Tone(ToneFrequency),
  TalkGroup(TalkGroupId),
  /// A TG selection whose id does not fit a [`TalkGroupId`].
  TalkGroupOutOfRange,
  TransmitterOn,
  TransmitterOff,
  SquelchOpen,
  SquelchClosed,
  TalkerStart,
  TalkerStop,
  Identification,
  ReflectorTimeout,
  NodeJoined,
  NodeLeft,
}

impl Signal {
  /// Counter bumped for this signal.
  pub fn event_kind(self) -> EventKind {
    match self {
      Self::Tone(_) => EventKind::CtcssDetections,
      Self::TalkGroup(_) | Self::TalkGroupOutOfRange => EventKind::TgSelections,
      Self::TransmitterOn => EventKind::TransmitterOn,
      Self::TransmitterOff => EventKind::TransmitterOff,
      Self::SquelchOpen => EventKind::SquelchOpen,
      Self::SquelchClosed => EventKind::SquelchClosed,
      Self::TalkerStart => EventKind::TalkerStart,
      Self::TalkerStop => EventKind::TalkerStop,
      Self::Identification => EventKind::Identifications,
      Self::ReflectorTimeout => EventKind::ReflectorDisconnects,
      Self::NodeJoined => EventKind::NodesJoined,
      Self::NodeLeft => EventKind::NodesLeft,
    }
  }
}

/// Append every signal found in `message` to `out`.
pub fn classify(message: &str, out: &mut Vec<Signal>) {
  if let Some(freq) = ctcss_tone(message) {
    out.push(Signal::Tone(freq));
  }
  match selected_talk_group(message) {
    Some(Some(tg)) => out.push(Signal::TalkGroup(tg)),
    Some(None) => out.push(Signal::TalkGroupOutOfRange),
    None => {}
  }
  if message.contains(TX_ON) {
    out.push(Signal::TransmitterOn);
  }
  if message.contains(TX_OFF) {
    out.push(Signal::TransmitterOff);
  }
  if message.contains(SQUELCH_OPEN) {
    out.push(Signal::SquelchOpen);
  }
  if message.contains(SQUELCH_CLOSED) {
    out.push(Signal::SquelchClosed);
  }
  if message.contains(TALKER_START) {
    out.push(Signal::TalkerStart);
  }
  if message.contains(TALKER_STOP) {
    out.push(Signal::TalkerStop);
  }
  if contains_ignore_ascii_case(message, IDENTIFICATION) {
    out.push(Signal::Identification);
  }
  if message.contains(REFLECTOR_DISCONNECTED) && message.contains(CONNECTION_TIMED_OUT) {
    out.push(Signal::ReflectorTimeout);
  }
  if message.contains(NODE_JOINED) {
    out.push(Signal::NodeJoined);
  }
  if message.contains(NODE_LEFT) {
    out.push(Signal::NodeLeft);
  }
}

/// "Rx1: 88.5 Hz CTCSS tone detected" -> 88.5
fn ctcss_tone(message: &str) -> Option<ToneFrequency> {
  let pos = message.find(CTCSS_SUFFIX)?;
  let digits = trailing_decimal(&message[..pos])?;
  digits.parse::<f64>().ok().map(ToneFrequency)
}

/// "ReflectorLogic: Selecting TG #2222" -> Some(Some(2222))
///
/// `Some(None)` when the digits are present but overflow the id type.
fn selected_talk_group(message: &str) -> Option<Option<TalkGroupId>> {
  let pos = message.find(TG_PREFIX)?;
  let rest = &message[pos + TG_PREFIX.len()..];
  let end = rest
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(rest.len());
  if end == 0 {
    return None;
  }
  Some(rest[..end].parse().ok())
}

/// Longest suffix of `s` shaped like `\d+\.?\d*`.
fn trailing_decimal(s: &str) -> Option<&str> {
  let b = s.as_bytes();
  let mut i = b.len();
  while i > 0 && b[i - 1].is_ascii_digit() {
    i -= 1;
  }
  if i > 0 && b[i - 1] == b'.' {
    let dot = i - 1;
    let mut j = dot;
    while j > 0 && b[j - 1].is_ascii_digit() {
      j -= 1;
    }
    if j < dot {
      return Some(&s[j..]);
    }
  }
  (i < b.len()).then(|| &s[i..])
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
  let needle = needle.as_bytes();
  haystack
    .as_bytes()
    .windows(needle.len())
    .any(|w| w.eq_ignore_ascii_case(needle))
}
