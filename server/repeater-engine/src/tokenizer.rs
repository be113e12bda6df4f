//! Split raw log lines into `(timestamp, message)` pairs.
//!
//! Grammar: `<Www> <Mmm> <d|dd> <HH:MM:SS> <YYYY>: <message>`. Whitespace runs
//! inside the date are collapsed first, so space-padded days ("Oct  5") match.
//! Anything that does not fit the grammar is skipped; a line that fits it but
//! names an impossible date or time is a fatal error.

use chrono::{NaiveDateTime, Timelike, Weekday};

use crate::error::EngineError;
use crate::types::LogLine;

const SEPARATOR: &str = ": ";

/// Tokenize one line. `line_no` is 1-based and only used for error context.
///
/// Returns `Ok(None)` for blank or non-matching lines.
pub fn tokenize(line: &str, line_no: usize) -> Result<Option<LogLine<'_>>, EngineError> {
  let line = line.trim();
  if line.is_empty() {
    return Ok(None);
  }

  let Some(split) = line.find(SEPARATOR) else {
    return Ok(None);
  };
  let message = &line[split + SEPARATOR.len()..];
  if message.is_empty() {
    return Ok(None);
  }

  let date = &line[..split];
  if date.ends_with(char::is_whitespace) {
    return Ok(None);
  }

  let fields: Vec<&str> = date.split_whitespace().collect();
  let &[weekday, month, day, time, year] = fields.as_slice() else {
    return Ok(None);
  };
  if !matches_grammar(weekday, month, day, time, year) {
    return Ok(None);
  }

  let collapsed = fields.join(" ");
  let timestamp = parse_timestamp(weekday, month, day, time, year)
    .map_err(|reason| EngineError::timestamp(line_no, &collapsed, reason))?;

  Ok(Some(LogLine { timestamp, message }))
}

/// Shape check only; calendar validity is left to chrono.
fn matches_grammar(weekday: &str, month: &str, day: &str, time: &str, year: &str) -> bool {
  is_word(weekday, 3)
    && is_word(month, 3)
    && (1..=2).contains(&day.len())
    && is_digits(day)
    && is_clock(time)
    && year.len() == 4
    && is_digits(year)
}

fn parse_timestamp(
  weekday: &str,
  month: &str,
  day: &str,
  time: &str,
  year: &str,
) -> Result<NaiveDateTime, String> {
  // The weekday has to be a real abbreviation but is not cross-checked
  // against the date.
  weekday
    .parse::<Weekday>()
    .map_err(|_| format!("unknown weekday {:?}", weekday))?;

  let text = format!("{} {} {} {}", month, day, time, year);
  let timestamp =
    NaiveDateTime::parse_from_str(&text, "%b %d %H:%M:%S %Y").map_err(|e| e.to_string())?;

  // chrono reads second 60 as a leap second; log clocks never emit one.
  if timestamp.nanosecond() >= 1_000_000_000 {
    return Err(format!("second out of range in {:?}", time));
  }
  Ok(timestamp)
}

fn is_word(s: &str, len: usize) -> bool {
  s.len() == len && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn is_digits(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// HH:MM:SS with exactly two digits per field.
fn is_clock(s: &str) -> bool {
  let parts: Vec<&str> = s.split(':').collect();
  parts.len() == 3 && parts.iter().all(|p| p.len() == 2 && is_digits(p))
}
