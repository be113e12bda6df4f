//! Reduce a finished pass into a `StatisticsSnapshot`: aggregates, rankings, percentages.
//!
//! Pure over `PassState`; calling it twice on the same state yields equal snapshots.
//! Empty collections reduce to zeros, never to an error or a division by zero.

use std::collections::HashMap;

use crate::config::Config;
use crate::engine::PassState;
use crate::types::*;

pub fn reduce(pass: &PassState, config: &Config) -> StatisticsSnapshot {
  StatisticsSnapshot {
    transmissions: transmission_summary(pass, config),
    tones: tone_summary(pass, config),
    talk_groups: talk_group_summary(pass, config),
    qso: qso_summary(pass, config),
    disconnections: disconnection_summary(pass),
    events: pass.events.clone(),
  }
}

/// Mean, min and max of a duration list; all zero when empty.
pub fn extremes(durations: &[i64]) -> (f64, i64, i64) {
  if durations.is_empty() {
    return (0.0, 0, 0);
  }
  let sum: i64 = durations.iter().sum();
  let min = durations.iter().copied().min().unwrap_or(0);
  let max = durations.iter().copied().max().unwrap_or(0);
  (sum as f64 / durations.len() as f64, min, max)
}

/// `count / total * 100`, or 0 when the category is empty.
pub fn percentage(count: u64, total: u64) -> f64 {
  if total == 0 {
    0.0
  } else {
    count as f64 / total as f64 * 100.0
  }
}

pub fn breakdown(total_seconds: i64) -> DurationBreakdown {
  DurationBreakdown {
    hours: total_seconds / 3600,
    minutes: (total_seconds % 3600) / 60,
    seconds: total_seconds % 60,
    total_seconds,
  }
}

/// Render seconds as "Xm Ys", truncating fractions.
pub fn format_minutes(seconds: f64) -> String {
  let whole = seconds.max(0.0) as i64;
  format!("{}m {}s", whole / 60, whole % 60)
}

fn stat(seconds: f64) -> DurationStat {
  DurationStat {
    seconds,
    formatted: format_minutes(seconds),
  }
}

fn transmission_summary(pass: &PassState, config: &Config) -> TransmissionSummary {
  let durations: Vec<i64> = pass.transmissions.iter().map(|t| t.duration_seconds).collect();
  let (avg, min, max) = extremes(&durations);
  TransmissionSummary {
    carriers_opened: pass.carriers_opened,
    total_transmissions: pass.transmissions.len(),
    total_time: breakdown(pass.total_transmission_seconds),
    average: stat(avg),
    min: stat(min as f64),
    max: stat(max as f64),
    sessions: pass
      .transmissions
      .iter()
      .take(config.transmission_sample)
      .cloned()
      .collect(),
  }
}

fn tone_summary(pass: &PassState, config: &Config) -> ToneSummary {
  let total = pass.tones.total();
  ToneSummary {
    total_detections: total,
    unique_tones: pass.tones.len(),
    ranking: pass
      .tones
      .ranked()
      .into_iter()
      .take(config.top_tones)
      .map(|(frequency, count)| ToneRank {
        frequency,
        count,
        percentage: percentage(count, total),
      })
      .collect(),
  }
}

fn talk_group_summary(pass: &PassState, config: &Config) -> TalkGroupSummary {
  let total = pass.talk_groups.total();
  TalkGroupSummary {
    total_selections: total,
    unique_tgs: pass.talk_groups.len(),
    ranking: pass
      .talk_groups
      .ranked()
      .into_iter()
      .take(config.top_talk_groups)
      .map(|(tg, count)| TalkGroupRank {
        tg,
        count,
        percentage: percentage(count, total),
      })
      .collect(),
    durations: talk_group_durations(&pass.qsos),
  }
}

/// Group finalized QSOs by TG, ranked by total time (ties keep first-QSO order).
pub fn talk_group_durations(qsos: &[QsoSession]) -> Vec<TalkGroupDuration> {
  let mut index: HashMap<TalkGroupId, usize> = HashMap::new();
  let mut groups: Vec<(TalkGroupId, i64, u64)> = Vec::new();

  for qso in qsos {
    let slot = *index.entry(qso.tg).or_insert_with(|| {
      groups.push((qso.tg, 0, 0));
      groups.len() - 1
    });
    groups[slot].1 += qso.duration_seconds;
    groups[slot].2 += 1;
  }

  groups.sort_by(|a, b| b.1.cmp(&a.1));

  groups
    .into_iter()
    .map(|(tg, total_seconds, qso_count)| {
      let average_seconds = total_seconds as f64 / qso_count as f64;
      TalkGroupDuration {
        tg,
        total_seconds,
        qso_count,
        average_seconds,
        formatted_total: format_minutes(total_seconds as f64),
        formatted_average: format_minutes(average_seconds),
      }
    })
    .collect()
}

fn qso_summary(pass: &PassState, config: &Config) -> QsoSummary {
  let durations: Vec<i64> = pass.qsos.iter().map(|q| q.duration_seconds).collect();
  let (avg, min, max) = extremes(&durations);
  QsoSummary {
    total_qso: pass.qsos.len(),
    total_time: breakdown(durations.iter().sum()),
    average: stat(avg),
    min: stat(min as f64),
    max: stat(max as f64),
    sessions: pass.qsos.iter().take(config.qso_sample).cloned().collect(),
  }
}

fn disconnection_summary(pass: &PassState) -> DisconnectionSummary {
  DisconnectionSummary {
    total_periods: pass.disconnections.len(),
    total_disconnections: pass.disconnections.iter().map(|p| p.count).sum(),
    total_downtime_seconds: pass
      .disconnections
      .iter()
      .filter_map(|p| p.duration_seconds)
      .sum(),
    periods: pass.disconnections.clone(),
  }
}
