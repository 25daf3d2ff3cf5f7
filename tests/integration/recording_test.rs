//! End-to-end recording through capture, batching and the streaming writer

use std::fs;
use std::io::Read;

use acast::asciicast::{Header, Recording};
use acast::capture::{CaptureStream, ManualClock, EXIT_ECHO};
use acast::writer::{StreamWriter, WriterOptions};
use acast::{Config, Recorder};

fn header() -> Header {
    Header {
        timestamp: 1_700_000_000,
        ..Header::new(80, 24)
    }
}

/// Deterministic lowercase text with no useful repetition.
fn letters(len: usize) -> String {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (b'a' + (state % 26) as u8) as char
        })
        .collect()
}

/// Reader that hands out one chunk per `read` call.
struct Chunks(Vec<Vec<u8>>);

impl Chunks {
    fn new(chunks: &[&str]) -> Self {
        Self(chunks.iter().rev().map(|c| c.as_bytes().to_vec()).collect())
    }
}

impl Read for Chunks {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0.pop() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }
}

#[test]
fn repetitive_burst_is_one_block_and_unique_write_stays_raw() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("burst.cast");
    let clock = ManualClock::new();

    let writer = StreamWriter::create(&path, &header(), WriterOptions::default()).unwrap();
    let mut capture = CaptureStream::with_clock(writer, 1.0, clock.clone());

    for _ in 0..50 {
        clock.advance_secs(0.01);
        capture.capture(b"0123456789").unwrap();
    }
    let unique = letters(6000);
    clock.advance_secs(0.01);
    capture.capture(unique.as_bytes()).unwrap();

    capture.close().unwrap();
    let summary = capture.sink_mut().close().unwrap();
    drop(capture);

    assert_eq!(summary.frames_received, 51);
    assert_eq!(summary.compressed_blocks, 1);
    assert_eq!(summary.frames_compressed, 50);

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.skipped_lines, 0);
    assert_eq!(recording.frames.len(), 2);

    let block = &recording.frames[0];
    assert!(block.is_compressed());
    assert_eq!(block.time, 0.01);
    assert_eq!(block.end_time, Some(0.5));
    assert_eq!(
        block.output_bytes().unwrap().as_ref(),
        "0123456789".repeat(50).as_bytes()
    );

    let last = &recording.frames[1];
    assert!(!last.is_compressed());
    assert_eq!(last.data, unique);
    assert_eq!(recording.header.duration, Some(0.51));

    // Block is keyed, raw frame positional
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[1].starts_with(r#"{"a":0.01,"b":"z","c":"H4sI"#));
    assert!(lines[2].starts_with(r#"[0.51,"o",""#));
}

#[test]
fn recorder_drops_trailing_exit_echo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.cast");
    let recorder = Recorder::new(Config::default()).handle_interrupts(false);

    let writes = ["$ ls\r\n", "Cargo.toml  src\r\n", "$ ", EXIT_ECHO];
    let summary = recorder
        .record_with_clock(Chunks::new(&writes), &path, &header(), ManualClock::new())
        .unwrap();

    assert!(summary.trimmed_exit);
    assert_eq!(summary.frames, writes.len() - 1);

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.frames.len(), writes.len() - 1);
    assert_eq!(recording.frames.last().unwrap().data, "$ ");
}

#[test]
fn recorder_respects_disabled_compression() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.cast");
    let mut config = Config::default();
    config.compression.enabled = false;
    let recorder = Recorder::new(config).handle_interrupts(false);

    let writes = vec!["tick\r\n"; 20];
    let summary = recorder
        .record_with_clock(Chunks::new(&writes), &path, &header(), ManualClock::new())
        .unwrap();
    assert_eq!(summary.writer.compressed_blocks, 0);

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.frames.len(), 20);
    assert!(recording.frames.iter().all(|f| !f.is_compressed()));
}

#[test]
fn same_tick_writes_are_half_a_second_apart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ticks.cast");
    let mut config = Config::default();
    config.compression.enabled = false;
    let recorder = Recorder::new(config).handle_interrupts(false);

    recorder
        .record_with_clock(Chunks::new(&["a", "b", "c"]), &path, &header(), ManualClock::new())
        .unwrap();

    let times: Vec<f64> = Recording::load(&path)
        .unwrap()
        .frames
        .iter()
        .map(|f| f.time)
        .collect();
    assert_eq!(times, vec![0.5, 1.0, 1.5]);
}

#[test]
fn header_metadata_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta.cast");
    let recorder = Recorder::new(Config::default()).handle_interrupts(false);
    let header = header().with_title("build log").with_command("make -j8");

    recorder
        .record_with_clock(Chunks::new(&["ok\r\n"]), &path, &header, ManualClock::new())
        .unwrap();

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.header.title.as_deref(), Some("build log"));
    assert_eq!(recording.header.command.as_deref(), Some("make -j8"));
    assert_eq!(recording.header.width, 80);
}
