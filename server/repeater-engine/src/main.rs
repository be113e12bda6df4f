//! Binary entrypoint: analyze log files, write JSON lines to stdout.
//!
//! Each output line is either:
//! - A DailyReport (the input was analyzed)
//! - An ErrorOutput (the input was unreadable or carried an invalid timestamp)
//!
//! With no paths, stdin is analyzed as a single log. Diagnostics go to stderr.

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use repeater_engine::types::ErrorOutput;
use repeater_engine::{Config, DailyReport, Engine, EngineError};

#[derive(Debug, Parser)]
#[command(name = "repeater-engine", version, about = "Correlate SvxLink repeater logs into daily statistics")]
struct Cli {
  /// TOML file overriding engine thresholds.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Log files to analyze. Reads stdin when none are given.
  paths: Vec<PathBuf>,
}

type Outcome = (Option<PathBuf>, Result<DailyReport, EngineError>);

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let config = match &cli.config {
    Some(path) => match Config::load(path) {
      Ok(config) => config,
      Err(e) => {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
      }
    },
    None => Config::default(),
  };

  let outcomes = if cli.paths.is_empty() {
    let mut engine = Engine::new(config);
    vec![(None, engine.report_reader(io::stdin().lock()))]
  } else {
    analyze_files(&cli.paths, &config)
  };

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let mut failed = false;

  for (path, result) in outcomes {
    let shown = path.as_ref().map(|p| p.display().to_string());
    match result {
      Ok(report) => {
        if report.date.is_none() {
          if let Some(shown) = &shown {
            warn!(path = %shown, "no date recognized in filename");
          }
        }
        info!(
          path = shown.as_deref().unwrap_or("<stdin>"),
          transmissions = report.snapshot.transmissions.total_transmissions,
          qsos = report.snapshot.qso.total_qso,
          disconnections = report.snapshot.disconnections.total_periods,
          "analyzed"
        );
        let _ = serde_json::to_writer(&mut out, &report);
      }
      Err(e) => {
        failed = true;
        error!(path = shown.as_deref().unwrap_or("<stdin>"), error = %e, "analysis failed");
        let mut err = ErrorOutput::new(e.to_string());
        if let Some(shown) = shown {
          err = err.with_path(shown);
        }
        let _ = serde_json::to_writer(&mut out, &err);
      }
    }
    let _ = writeln!(out);
  }

  let _ = out.flush();
  if failed {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}

/// One engine per file, a batch of files at a time. Outcomes keep argument order.
fn analyze_files(paths: &[PathBuf], config: &Config) -> Vec<Outcome> {
  let batch = thread::available_parallelism()
    .map(NonZeroUsize::get)
    .unwrap_or(1);

  let mut outcomes = Vec::with_capacity(paths.len());
  for chunk in paths.chunks(batch) {
    thread::scope(|s| {
      let handles: Vec<_> = chunk
        .iter()
        .map(|path| {
          s.spawn(move || {
            let mut engine = Engine::new(config.clone());
            engine.report_file(path)
          })
        })
        .collect();

      for (path, handle) in chunk.iter().zip(handles) {
        let result = handle
          .join()
          .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        outcomes.push((Some(path.clone()), result));
      }
    });
  }
  outcomes
}
