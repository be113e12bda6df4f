//! Per-file daily report: the snapshot plus the metadata a store keys it by.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::types::DailyReport;

/// Extract the log date from a filename.
///
/// Recognized shapes: `svxlink_log_YYYY-MM-DD.txt`, `svxlink_YYYY-MM-DD.log`,
/// `YYYY-MM-DD.txt`, `YYYYMMDD.txt` and `log_YYYY-MM-DD*`. Returns `None` when
/// nothing matches or the digits are not a real date.
pub fn date_from_filename(name: &str) -> Option<NaiveDate> {
  let bytes = name.as_bytes();

  for start in 0..bytes.len() {
    if start + 10 > bytes.len() {
      break;
    }
    let Some(candidate) = name.get(start..start + 10) else {
      continue;
    };
    if !is_iso_date_shape(candidate) {
      continue;
    }
    let before = &name[..start];
    let after = &name[start + 10..];
    let recognized = after.starts_with(".txt")
      || before.ends_with("log_")
      || (before.ends_with("svxlink_") && after.starts_with(".log"));
    if recognized {
      if let Ok(date) = NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
        return Some(date);
      }
    }
  }

  for start in 0..bytes.len() {
    if start + 8 > bytes.len() {
      break;
    }
    let Some(candidate) = name.get(start..start + 8) else {
      continue;
    };
    if candidate.bytes().all(|b| b.is_ascii_digit()) && name[start + 8..].starts_with(".txt") {
      if let Ok(date) = NaiveDate::parse_from_str(candidate, "%Y%m%d") {
        return Some(date);
      }
    }
  }

  None
}

/// `DDDD-DD-DD`
fn is_iso_date_shape(s: &str) -> bool {
  s.bytes().enumerate().all(|(i, b)| match i {
    4 | 7 => b == b'-',
    _ => b.is_ascii_digit(),
  })
}

impl Engine {
  /// Analyze a log file into a `DailyReport`, dated from its filename.
  pub fn report_file(&mut self, path: impl AsRef<Path>) -> Result<DailyReport, EngineError> {
    let path = path.as_ref();
    let raw = match std::fs::read(path) {
      Ok(raw) => raw,
      Err(e) => {
        self.reset();
        return Err(EngineError::io(path, e));
      }
    };
    let filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let date = filename.as_deref().and_then(date_from_filename);
    self.report_bytes(&raw, filename, date)
  }

  /// Analyze an anonymous stream (stdin). The report carries no filename or date.
  pub fn report_reader<R: Read>(&mut self, mut reader: R) -> Result<DailyReport, EngineError> {
    let mut raw = Vec::new();
    if let Err(e) = reader.read_to_end(&mut raw) {
      self.reset();
      return Err(EngineError::Read(e));
    }
    self.report_bytes(&raw, None, None)
  }

  fn report_bytes(
    &mut self,
    raw: &[u8],
    filename: Option<String>,
    date: Option<NaiveDate>,
  ) -> Result<DailyReport, EngineError> {
    let snapshot = self.parse_bytes(raw)?;
    Ok(DailyReport {
      date,
      filename,
      file_size: raw.len() as u64,
      source_digest: blake3::hash(raw).to_hex().to_string(),
      snapshot,
    })
  }
}
