use journal_relay::config::{ForwarderConfig, WatcherConfig};
use journal_relay::forwarder::{HttpSink, RecordingSink};
use journal_relay::{JournalWatcher, PollOutcome};
use httpmock::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const DEPOT_OLD: &str =
    r#"{"timestamp":"2025-04-01T10:00:00Z","event":"ColonisationConstructionDepot","ConstructionProgress":0.25}"#;
const DEPOT_NEW: &str =
    r#"{"timestamp":"2025-04-01T10:05:00Z","event":"ColonisationConstructionDepot","ConstructionProgress":0.5}"#;
const DEPOT_ROTATED: &str =
    r#"{"timestamp":"2025-04-01T11:00:00Z","event":"ColonisationConstructionDepot","ConstructionProgress":0.75}"#;
const FSD_JUMP: &str = r#"{"timestamp":"2025-04-01T10:03:00Z","event":"FSDJump","StarSystem":"Sol"}"#;

fn append_lines(path: &Path, lines: &[&str]) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
}

fn set_mtime(path: &Path, secs_after_base: u64) {
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_743_500_000);
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(base + Duration::from_secs(secs_after_base))
        .unwrap();
}

fn watcher_config(dir: &Path) -> WatcherConfig {
    WatcherConfig {
        journal_dir: Some(dir.to_path_buf()),
        poll_interval_seconds: 1,
        ..WatcherConfig::default()
    }
}

#[test]
fn test_forwards_latest_match_across_rotation() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let save = |line: &'static str| {
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/save")
                .header("content-type", "application/json")
                .body(line);
            then.status(200);
        })
    };
    let old_mock = save(DEPOT_OLD);
    let new_mock = save(DEPOT_NEW);
    let rotated_mock = save(DEPOT_ROTATED);

    let sink = HttpSink::new(&ForwarderConfig {
        endpoint: server.url("/api/save"),
        timeout_seconds: 5,
        echo_lines: false,
        ..ForwarderConfig::default()
    })
    .unwrap();
    let mut watcher = JournalWatcher::new(&watcher_config(dir.path()), sink);

    // Nothing to watch yet
    assert_eq!(watcher.poll_once(), PollOutcome::NoCandidate);

    let first = dir.path().join("Journal.2025-04-01T100000.01.log");
    append_lines(&first, &[DEPOT_OLD, FSD_JUMP, DEPOT_NEW]);
    set_mtime(&first, 0);

    assert_eq!(
        watcher.poll_once(),
        PollOutcome::Tailed {
            rotated: true,
            forwarded: true
        }
    );
    new_mock.assert_hits(1);

    // Quiet cycle
    assert_eq!(
        watcher.poll_once(),
        PollOutcome::Tailed {
            rotated: false,
            forwarded: false
        }
    );

    // The game starts a new journal
    let second = dir.path().join("Journal.2025-04-01T110000.01.log");
    append_lines(&second, &[FSD_JUMP, DEPOT_ROTATED]);
    set_mtime(&second, 3600);

    assert_eq!(
        watcher.poll_once(),
        PollOutcome::Tailed {
            rotated: true,
            forwarded: true
        }
    );
    rotated_mock.assert_hits(1);

    // The older journal growing does not pull the watcher back
    append_lines(&first, &[DEPOT_OLD]);
    set_mtime(&first, 10);
    watcher.poll_once();

    old_mock.assert_hits(0);
    new_mock.assert_hits(1);
    rotated_mock.assert_hits(1);

    let stats = watcher.sink().stats();
    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.failed, 0);
}

#[test]
fn test_collector_down_does_not_stall_tailing() {
    let dir = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/api/save", listener.local_addr().unwrap());
    drop(listener);

    let sink = HttpSink::new(&ForwarderConfig {
        endpoint,
        timeout_seconds: 2,
        echo_lines: false,
        ..ForwarderConfig::default()
    })
    .unwrap();
    let mut watcher = JournalWatcher::new(&watcher_config(dir.path()), sink);

    let journal = dir.path().join("Journal.01.log");
    append_lines(&journal, &[DEPOT_OLD]);
    watcher.poll_once();

    append_lines(&journal, &[DEPOT_NEW]);
    watcher.poll_once();

    let active = watcher.current().unwrap();
    assert_eq!(active.offset, std::fs::metadata(&journal).unwrap().len());
    assert_eq!(watcher.sink().stats().failed, 2);
}

#[test]
fn test_nested_directories_and_partial_writes() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("sessions");
    std::fs::create_dir(&nested).unwrap();

    let mut watcher = JournalWatcher::new(&watcher_config(dir.path()), RecordingSink::new());

    let journal = nested.join("Journal.01.log");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&journal)
        .unwrap();

    // Half a line is left unconsumed until its terminator arrives
    file.write_all(br#"{"event":"ColonisationConstructionDepot","#)
        .unwrap();
    watcher.poll_once();
    assert!(watcher.sink().lines().is_empty());
    assert_eq!(watcher.current().unwrap().offset, 0);

    file.write_all(b"\"x\":1}\n").unwrap();
    writeln!(file, "{}", DEPOT_NEW).unwrap();
    watcher.poll_once();

    assert_eq!(watcher.sink().lines(), &[DEPOT_NEW.to_string()]);
    assert_eq!(
        watcher.current().unwrap().offset,
        std::fs::metadata(&journal).unwrap().len()
    );
}
