//! Integration tests for the repeater engine.

use std::io::Write;

use repeater_engine::types::{DisconnectionStatus, EventKind, ToneFrequency};
use repeater_engine::{Config, Engine, EngineError};

fn fixture_log() -> &'static str {
  "\
Sun Oct 19 07:59:58 2025: ReflectorLogic: Selecting TG #0
Sun Oct 19 08:00:00 2025: Rx1: squelch is OPEN
Sun Oct 19 08:00:00 2025: Rx1: 88.5 Hz CTCSS tone detected
Sun Oct 19 08:00:01 2025: ReflectorLogic: Selecting TG #2222
Sun Oct 19 08:00:01 2025: Tx1: Turning the transmitter ON
Sun Oct 19 08:00:01 2025: ReflectorLogic: Talker start on TG #2222: IW1ABC
Sun Oct 19 08:00:21 2025: ReflectorLogic: Talker stop on TG #2222: IW1ABC
Sun Oct 19 08:00:21 2025: Rx1: squelch is CLOSED
Sun Oct 19 08:00:23 2025: Tx1: Turning the transmitter OFF
Sun Oct 19 08:00:40 2025: Rx1: 88.5 Hz CTCSS tone detected
Sun Oct 19 08:00:40 2025: ReflectorLogic: Selecting TG #91
Sun Oct 19 08:00:41 2025: Tx1: Turning the transmitter ON
Sun Oct 19 08:01:01 2025: Tx1: Turning the transmitter OFF
Sun Oct 19 08:01:31 2025: ReflectorLogic: Selecting TG #0
this line is garbage and must be ignored

Sun Oct 19 08:05:00 2025: Rx1: 71.9 Hz CTCSS tone detected
Sun Oct 19 08:05:00 2025: ReflectorLogic: Selecting TG #91
Sun Oct 19 08:05:02 2025: ReflectorLogic: Selecting TG #0
Sun Oct 19 08:10:00 2025: SimplexLogic: Sending long identification...
Sun Oct 19 09:00:00 2025: ReflectorLogic: Disconnected from 10.0.0.1:5300: Connection timed out
Sun Oct 19 09:00:30 2025: ReflectorLogic: Disconnected from 10.0.0.1:5300: Connection timed out
Sun Oct 19 09:01:00 2025: ReflectorLogic: Disconnected from 10.0.0.1:5300: Connection timed out
Sun Oct 19 09:05:00 2025: ReflectorLogic: Node joined: IW1ABC
Sun Oct 19 09:06:00 2025: ReflectorLogic: Node left: IW1ABC
"
}

#[test]
fn full_log_produces_expected_snapshot() {
  let mut engine = Engine::with_defaults();
  let snap = engine.parse_str(fixture_log()).unwrap();

  // Transmissions: 22s + 20s.
  assert_eq!(snap.transmissions.carriers_opened, 2);
  assert_eq!(snap.transmissions.total_transmissions, 2);
  assert_eq!(snap.transmissions.total_time.total_seconds, 42);
  assert_eq!(snap.transmissions.min.seconds, 20.0);
  assert_eq!(snap.transmissions.max.seconds, 22.0);
  assert_eq!(snap.transmissions.average.seconds, 21.0);
  assert_eq!(snap.transmissions.average.formatted, "0m 21s");

  // Tones: 88.5 twice, 71.9 once.
  assert_eq!(snap.tones.total_detections, 3);
  assert_eq!(snap.tones.unique_tones, 2);
  assert_eq!(snap.tones.ranking[0].frequency, ToneFrequency(88.5));
  assert_eq!(snap.tones.ranking[0].count, 2);

  // TG tallies exclude #0. 2222 seen first, 91 twice.
  assert_eq!(snap.talk_groups.total_selections, 3);
  assert_eq!(snap.talk_groups.ranking[0].tg, 91);
  assert_eq!(snap.talk_groups.ranking[0].count, 2);
  assert_eq!(snap.talk_groups.ranking[1].tg, 2222);

  // One QSO 08:00:01 -> 08:01:31 attributed to the last TG (91); the 2s bounce is dropped.
  assert_eq!(snap.qso.total_qso, 1);
  assert_eq!(snap.qso.sessions[0].tg, 91);
  assert_eq!(snap.qso.sessions[0].duration_seconds, 90);
  assert_eq!(snap.talk_groups.durations.len(), 1);
  assert_eq!(snap.talk_groups.durations[0].tg, 91);
  assert_eq!(snap.talk_groups.durations[0].total_seconds, 90);

  // Three timeouts coalesce, resolved by the join.
  assert_eq!(snap.disconnections.total_periods, 1);
  assert_eq!(snap.disconnections.total_disconnections, 3);
  assert_eq!(snap.disconnections.total_downtime_seconds, 300);
  assert_eq!(snap.disconnections.periods[0].status, DisconnectionStatus::Resolved);

  assert_eq!(snap.events[&EventKind::SquelchOpen], 1);
  assert_eq!(snap.events[&EventKind::SquelchClosed], 1);
  assert_eq!(snap.events[&EventKind::TalkerStart], 1);
  assert_eq!(snap.events[&EventKind::TalkerStop], 1);
  assert_eq!(snap.events[&EventKind::Identifications], 1);
  assert_eq!(snap.events[&EventKind::NodesJoined], 1);
  assert_eq!(snap.events[&EventKind::NodesLeft], 1);
  assert_eq!(snap.events[&EventKind::ReflectorDisconnects], 3);
}

#[test]
fn deterministic_output_across_runs() {
  let mut engine1 = Engine::with_defaults();
  let json1 = serde_json::to_string(&engine1.parse_str(fixture_log()).unwrap()).unwrap();

  let mut engine2 = Engine::with_defaults();
  let json2 = serde_json::to_string(&engine2.parse_str(fixture_log()).unwrap()).unwrap();

  assert_eq!(json1, json2, "Same input must produce identical JSON output");
  assert_eq!(
    serde_json::to_string(&engine1.snapshot()).unwrap(),
    json1,
    "Recomputing the snapshot must not change it"
  );
}

#[test]
fn scenario_a_single_transmission() {
  let mut engine = Engine::with_defaults();
  let snap = engine
    .parse_str(
      "Sun Oct 19 08:00:00 2025: Tx1: Turning the transmitter ON\n\
       Sun Oct 19 08:00:05 2025: Tx1: Turning the transmitter OFF\n",
    )
    .unwrap();
  assert_eq!(snap.transmissions.total_transmissions, 1);
  assert_eq!(snap.transmissions.sessions[0].duration_seconds, 5);
  assert_eq!(snap.transmissions.carriers_opened, 1);
}

#[test]
fn scenario_b_short_qso_is_dropped() {
  let mut engine = Engine::with_defaults();
  let snap = engine
    .parse_str(
      "Sun Oct 19 08:00:00 2025: ReflectorLogic: Selecting TG #100\n\
       Sun Oct 19 08:00:02 2025: ReflectorLogic: Selecting TG #0\n",
    )
    .unwrap();
  assert_eq!(snap.talk_groups.ranking.len(), 1);
  assert_eq!(snap.talk_groups.ranking[0].tg, 100);
  assert_eq!(snap.talk_groups.ranking[0].count, 1);
  assert_eq!(snap.qso.total_qso, 0);
}

#[test]
fn scenario_c_qso_is_kept() {
  let mut engine = Engine::with_defaults();
  let snap = engine
    .parse_str(
      "Sun Oct 19 08:00:00 2025: ReflectorLogic: Selecting TG #100\n\
       Sun Oct 19 08:00:10 2025: ReflectorLogic: Selecting TG #0\n",
    )
    .unwrap();
  assert_eq!(snap.qso.total_qso, 1);
  assert_eq!(snap.qso.sessions[0].tg, 100);
  assert_eq!(snap.qso.sessions[0].duration_seconds, 10);
}

#[test]
fn scenario_d_coalesced_disconnection() {
  let mut engine = Engine::with_defaults();
  let snap = engine
    .parse_str(
      "Tue Feb 17 03:00:00 2026: ReflectorLogic: Disconnected from 1.2.3.4:5300: Connection timed out\n\
       Tue Feb 17 03:00:30 2026: ReflectorLogic: Disconnected from 1.2.3.4:5300: Connection timed out\n\
       Tue Feb 17 03:02:00 2026: ReflectorLogic: Node joined: IZ2XYZ\n",
    )
    .unwrap();
  let periods = &snap.disconnections.periods;
  assert_eq!(periods.len(), 1);
  assert_eq!(periods[0].count, 2);
  assert_eq!(periods[0].status, DisconnectionStatus::Resolved);
  assert_eq!(
    periods[0].end.unwrap().format("%H:%M:%S").to_string(),
    "03:02:00"
  );
  assert_eq!(periods[0].duration_seconds, Some(120));
}

#[test]
fn scenario_e_empty_input() {
  let mut engine = Engine::with_defaults();
  let snap = engine.parse_str("").unwrap();
  assert_eq!(snap.transmissions.total_transmissions, 0);
  assert_eq!(snap.transmissions.carriers_opened, 0);
  assert_eq!(snap.transmissions.average.seconds, 0.0);
  assert_eq!(snap.qso.total_qso, 0);
  assert_eq!(snap.qso.average.seconds, 0.0);
  assert!(snap.tones.ranking.is_empty());
  assert!(snap.talk_groups.ranking.is_empty());
  assert!(snap.disconnections.periods.is_empty());

  // Still a well-formed JSON document.
  let json = serde_json::to_value(&snap).unwrap();
  assert_eq!(json["transmissions"]["total_time"]["total_seconds"], 0);
}

#[test]
fn open_disconnection_is_flushed_at_last_marker() {
  let mut engine = Engine::with_defaults();
  let snap = engine
    .parse_str(
      "Tue Feb 17 03:00:00 2026: ReflectorLogic: Disconnected from 1.2.3.4:5300: Connection timed out\n\
       Tue Feb 17 03:00:45 2026: ReflectorLogic: Disconnected from 1.2.3.4:5300: Connection timed out\n\
       Tue Feb 17 04:00:00 2026: Rx1: squelch is OPEN\n",
    )
    .unwrap();
  let period = &snap.disconnections.periods[0];
  assert_eq!(period.status, DisconnectionStatus::Resolved);
  assert_eq!(period.end.unwrap().format("%H:%M:%S").to_string(), "03:00:45");
  assert_eq!(period.count, 2);
}

#[test]
fn invalid_timestamp_fails_whole_pass() {
  let mut engine = Engine::with_defaults();
  let input = format!("{}Thu Feb 30 10:00:00 2025: broken\n", fixture_log());
  let err = engine.parse_str(&input).unwrap_err();
  assert!(
    err.to_string().contains("Feb 30"),
    "Error should quote the offending text: {}",
    err
  );
}

#[test]
fn leap_second_fails_whole_pass() {
  let mut engine = Engine::with_defaults();
  let input = "\
Sun Oct 19 23:59:60 2025: Tx1: Turning the transmitter ON
Mon Oct 20 00:00:05 2025: Tx1: Turning the transmitter OFF
";
  let err = engine.parse_str(input).unwrap_err();
  assert!(matches!(err, EngineError::Timestamp { line: 1, .. }), "{}", err);
  assert!(engine.pass().transmissions.is_empty());
}

#[test]
fn snapshot_serializes_event_keys_in_snake_case() {
  let mut engine = Engine::with_defaults();
  let snap = engine.parse_str(fixture_log()).unwrap();
  let json = serde_json::to_value(&snap).unwrap();
  assert_eq!(json["events"]["ctcss_detections"], 3);
  assert_eq!(json["events"]["nodes_joined"], 1);
  assert_eq!(json["disconnections"]["periods"][0]["status"], "resolved");
  assert_eq!(json["tones"]["ranking"][0]["frequency"], 88.5);
}

#[test]
fn custom_min_qso_threshold() {
  let mut engine = Engine::new(Config {
    min_qso_seconds: 1,
    ..Config::default()
  });
  let snap = engine
    .parse_str(
      "Sun Oct 19 08:00:00 2025: ReflectorLogic: Selecting TG #100\n\
       Sun Oct 19 08:00:02 2025: ReflectorLogic: Selecting TG #0\n",
    )
    .unwrap();
  assert_eq!(snap.qso.total_qso, 1);
}

#[test]
fn report_file_is_dated_from_filename() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("svxlink_log_2025-10-19.txt");
  let mut file = std::fs::File::create(&path).unwrap();
  file.write_all(fixture_log().as_bytes()).unwrap();
  drop(file);

  let mut engine = Engine::with_defaults();
  let report = engine.report_file(&path).unwrap();
  assert_eq!(report.date.unwrap().to_string(), "2025-10-19");
  assert_eq!(report.filename.as_deref(), Some("svxlink_log_2025-10-19.txt"));
  assert_eq!(report.file_size, fixture_log().len() as u64);
  assert_eq!(report.snapshot.transmissions.total_transmissions, 2);

  let json = serde_json::to_value(&report).unwrap();
  assert_eq!(json["date"], "2025-10-19");
}

#[test]
fn report_file_with_undated_name() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("repeater.log");
  std::fs::write(&path, fixture_log()).unwrap();

  let mut engine = Engine::with_defaults();
  let report = engine.report_file(&path).unwrap();
  assert!(report.date.is_none());
}

#[test]
fn identical_content_has_identical_digest() {
  let dir = tempfile::tempdir().unwrap();
  let a = dir.path().join("2025-10-19.txt");
  let b = dir.path().join("2025-10-20.txt");
  std::fs::write(&a, fixture_log()).unwrap();
  std::fs::write(&b, fixture_log()).unwrap();

  let mut engine = Engine::with_defaults();
  let ra = engine.report_file(&a).unwrap();
  let rb = engine.report_file(&b).unwrap();
  assert_eq!(ra.source_digest, rb.source_digest);
  assert_ne!(ra.date, rb.date);
}

#[test]
fn missing_file_gives_io_error_with_path() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("svxlink_log_2025-10-19.txt");
  let mut engine = Engine::with_defaults();
  let err = engine.report_file(&path).unwrap_err();
  assert!(matches!(err, EngineError::Io { .. }));
  assert!(err.to_string().contains("svxlink_log_2025-10-19.txt"));
}
