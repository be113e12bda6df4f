//! Repeater Log Correlation Engine — deterministic, single-pass.
//!
//! Tokenizes SvxLink log lines, correlates transmitter keying, talk-group
//! QSOs and reflector disconnections, and reduces the pass into a
//! StatisticsSnapshot (averages, extremes, rankings, percentages).
//!
//! No DB, no network; pure computation over one complete input per pass.

pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod events;
pub mod report;
pub mod stats;
pub mod tally;
pub mod tokenizer;
pub mod types;

pub use config::Config;
pub use engine::{Engine, PassState};
pub use error::EngineError;
pub use report::date_from_filename;
pub use types::{DailyReport, StatisticsSnapshot};
