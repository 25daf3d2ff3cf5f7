//! Crash recovery of recordings on disk

use std::fs;
use std::io::Write;

use acast::asciicast::{Frame, Header, Recording};
use acast::writer::{repair_file, StreamWriter, WriterOptions};

use super::helpers::temp_fixture;

#[test]
fn truncated_recording_is_recovered() {
    let (_dir, path) = temp_fixture("truncated.cast");

    let report = repair_file(&path).unwrap();
    assert!(report.rewritten);
    assert_eq!(report.kept_frames, 2);
    assert_eq!(report.dropped_lines, 1);
    assert_eq!(report.duration, 1.25);

    insta::assert_snapshot!(fs::read_to_string(&path).unwrap(), @r###"
    {"version":2,"width":80,"height":24,"timestamp":1700000000,"duration":1.25}
    [0.5,"o","first\r\n"]
    [1.25,"o","second\r\n"]
    "###);

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.skipped_lines, 0);
    assert_eq!(recording.frames.len(), 2);
    assert_eq!(recording.header.duration, Some(1.25));
}

#[test]
fn second_repair_changes_nothing() {
    let (_dir, path) = temp_fixture("truncated.cast");
    repair_file(&path).unwrap();
    let once = fs::read(&path).unwrap();

    let report = repair_file(&path).unwrap();
    assert!(!report.rewritten);
    assert_eq!(report.dropped_lines, 0);
    assert_eq!(fs::read(&path).unwrap(), once);
}

#[test]
fn duration_includes_compressed_block_end() {
    let (_dir, path) = temp_fixture("mixed.cast");
    let before = fs::read_to_string(&path).unwrap();

    let report = repair_file(&path).unwrap();
    assert_eq!(report.kept_frames, 4);
    assert_eq!(report.duration, 1.5);

    // Frame lines are kept exactly as written, keyed or positional
    let after = fs::read_to_string(&path).unwrap();
    let old_frames: Vec<&str> = before.lines().skip(1).collect();
    let new_frames: Vec<&str> = after.lines().skip(1).collect();
    assert_eq!(old_frames, new_frames);
    assert!(after.lines().next().unwrap().contains(r#""duration":1.5"#));
}

#[test]
fn killed_writer_leaves_repairable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("killed.cast");
    let options = WriterOptions {
        compression: false,
        ..WriterOptions::default()
    };

    let mut writer = StreamWriter::create(&path, &Header::new(80, 24), options).unwrap();
    writer.push(Frame::output(0.5, "one\r\n")).unwrap();
    writer.push(Frame::output(1.0, "two\r\n")).unwrap();
    writer.push(Frame::output(1.5, "three\r\n")).unwrap();
    // No close and no drop, as if the process died
    std::mem::forget(writer);

    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"[2.0,"o","fo"#).unwrap();
    drop(file);

    let report = repair_file(&path).unwrap();
    assert_eq!(report.kept_frames, 3);
    assert_eq!(report.dropped_lines, 1);
    assert_eq!(report.duration, 1.5);

    let recording = Recording::load(&path).unwrap();
    let text: String = recording.frames.iter().map(|f| f.data.as_str()).collect();
    assert_eq!(text, "one\r\ntwo\r\nthree\r\n");
}

#[test]
fn header_only_file_gets_zero_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.cast");
    fs::write(&path, "{\"version\":2,\"width\":80,\"height\":24,\"timestamp\":0}\n").unwrap();

    let report = repair_file(&path).unwrap();
    assert_eq!(report.kept_frames, 0);
    assert_eq!(report.duration, 0.0);
    assert!(fs::read_to_string(&path)
        .unwrap()
        .starts_with(r#"{"version":2,"width":80,"height":24,"timestamp":0,"duration":0.0}"#));
}
