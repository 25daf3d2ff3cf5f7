//! Tests that drive the compiled binary

use std::fs;

use assert_cmd::prelude::*;
use predicates::prelude::*;

use acast::export::CommandOutput;
use acast::Recording;

use super::helpers::{acast, fixtures_dir, run_acast, temp_fixture};

#[test]
fn help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_acast(home.path(), &["--help"]);

    assert_eq!(code, 0);
    for name in [
        "record", "play", "repair", "cut", "speed", "quantize", "export", "info", "config",
        "completions",
    ] {
        assert!(stdout.contains(name), "help is missing {}", name);
    }
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_acast(home.path(), &[]);
    assert_eq!(code, 2);
    assert!(stderr.contains("Usage"));
}

#[test]
fn record_writes_piped_output() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::Command::from_std(acast(home.path()));
    cmd.current_dir(work.path())
        .args(["record", "build", "--cols", "120", "--rows", "40", "-c", "make"])
        .write_stdin("compiling\r\nfinished\r\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Recording to build.cast"));

    let recording = Recording::load(work.path().join("build.cast")).unwrap();
    assert_eq!(recording.header.width, 120);
    assert_eq!(recording.header.height, 40);
    assert_eq!(recording.header.title.as_deref(), Some("build"));
    assert_eq!(recording.header.command.as_deref(), Some("make"));
    assert!(recording.header.duration.is_some());

    let text: String = recording.frames.iter().map(|f| f.data.as_str()).collect();
    assert_eq!(text, "compiling\r\nfinished\r\n");
}

#[test]
fn record_accepts_tuning_flags() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::Command::from_std(acast(home.path()));
    cmd.current_dir(work.path())
        .args(["record", "tuned", "-i", "50", "--compress-ratio", "4"])
        .write_stdin("one\r\ntwo\r\n")
        .assert()
        .success();

    let recording = Recording::load(work.path().join("tuned.cast")).unwrap();
    let text: String = recording.frames.iter().map(|f| f.data.as_str()).collect();
    assert_eq!(text, "one\r\ntwo\r\n");
}

#[test]
fn record_refuses_to_overwrite() {
    let home = tempfile::tempdir().unwrap();
    let (dir, path) = temp_fixture("sample.cast");
    let before = fs::read(&path).unwrap();

    let mut cmd = assert_cmd::Command::from_std(acast(home.path()));
    cmd.current_dir(dir.path())
        .args(["record", "sample.cast"])
        .write_stdin("new output\r\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File already exists"));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn play_writes_recording_to_stdout() {
    let home = tempfile::tempdir().unwrap();
    let file = fixtures_dir().join("mixed.cast");

    acast(home.path())
        .args(["play", "--speed", "100"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("progress 50%\rdone\r\n$ "));
}

#[test]
fn play_missing_file_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_acast(home.path(), &["play", "/nonexistent/none.cast"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("File not found"));
}

#[test]
fn repair_reports_each_file() {
    let home = tempfile::tempdir().unwrap();
    let (_dir, path) = temp_fixture("truncated.cast");
    let path = path.to_string_lossy().to_string();

    let (stdout, _, code) = run_acast(home.path(), &["repair", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("repaired, 2 frame(s)"));
    assert!(stdout.contains("dropped 1 damaged line(s)"));

    let (stdout, _, code) = run_acast(home.path(), &["repair", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("already valid"));
}

#[test]
fn repair_fails_when_any_file_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_dir, path) = temp_fixture("sample.cast");
    let path = path.to_string_lossy().to_string();

    let (stdout, stderr, code) = run_acast(home.path(), &["repair", &path, "/nonexistent/x.cast"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("already valid"));
    assert!(stderr.contains("1 of 2 file(s) could not be repaired"));
}

fn frame_times(path: &std::path::Path) -> Vec<f64> {
    Recording::load(path).unwrap().frames.iter().map(|f| f.time).collect()
}

fn assert_times(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?}", actual);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
    }
}

#[test]
fn cut_removes_frames_into_new_file() {
    let home = tempfile::tempdir().unwrap();
    let (dir, path) = temp_fixture("sample.cast");
    let out = dir.path().join("cut.cast");
    let before = fs::read(&path).unwrap();

    let (stdout, _, code) = run_acast(
        home.path(),
        &["cut", "-s", "0.55", "-e", "0.7", &path.to_string_lossy(), &out.to_string_lossy()],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Wrote 2 frame(s)"));
    assert!(stdout.contains("(1 removed)"));

    assert_times(&frame_times(&out), &[0.5, 0.65]);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn cut_rejects_reversed_range() {
    let home = tempfile::tempdir().unwrap();
    let (dir, path) = temp_fixture("sample.cast");
    let out = dir.path().join("cut.cast");

    let (_, stderr, code) = run_acast(
        home.path(),
        &["cut", "--start", "2", "--end", "1", &path.to_string_lossy(), &out.to_string_lossy()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid time range"));
    assert!(!out.exists());
}

#[test]
fn speed_scales_whole_recording() {
    let home = tempfile::tempdir().unwrap();
    let (dir, path) = temp_fixture("sample.cast");
    let out = dir.path().join("fast.cast");

    let (_, _, code) = run_acast(
        home.path(),
        &["speed", "-f", "0.5", &path.to_string_lossy(), &out.to_string_lossy()],
    );
    assert_eq!(code, 0);
    assert_times(&frame_times(&out), &[0.25, 0.3, 0.4]);
    assert_eq!(Recording::load(&out).unwrap().header.duration, Some(0.4));
}

#[test]
fn quantize_shortens_long_delays() {
    let home = tempfile::tempdir().unwrap();
    let (dir, path) = temp_fixture("sample.cast");
    let out = dir.path().join("quantized.cast");

    let (_, _, code) = run_acast(
        home.path(),
        &["quantize", "-r", "0.4", &path.to_string_lossy(), &out.to_string_lossy()],
    );
    assert_eq!(code, 0);
    assert_times(&frame_times(&out), &[0.4, 0.5, 0.7]);

    let (_, stderr, code) = run_acast(
        home.path(),
        &["quantize", "-r", "3,1", &path.to_string_lossy(), &out.to_string_lossy()],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("Invalid quantization range"));
}

#[test]
fn info_describes_recording() {
    let home = tempfile::tempdir().unwrap();
    let file = fixtures_dir().join("mixed.cast");

    let (stdout, _, code) = run_acast(home.path(), &["info", &file.to_string_lossy()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Size:        100x30"));
    assert!(stdout.contains("Frames:      3 raw, 1 compressed block(s)"));
    assert!(stdout.contains("Compressed:"));
}

#[test]
fn export_writes_json_next_to_input() {
    let home = tempfile::tempdir().unwrap();
    let (dir, path) = temp_fixture("mixed.cast");

    let (stdout, _, code) = run_acast(home.path(), &["export", &path.to_string_lossy()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Exported 2 command(s)"));

    let json = fs::read_to_string(dir.path().join("mixed.json")).unwrap();
    let commands: Vec<CommandOutput> = serde_json::from_str(&json).unwrap();
    assert_eq!(commands[0].cmd, "$ make");
    assert!(commands[0].out.starts_with("progress 10%\r"));
    assert_eq!(commands[1].cmd, "done");
}

#[test]
fn config_path_honors_config_home() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_acast(home.path(), &["config", "path"]);

    assert_eq!(code, 0);
    let expected = home.path().join("acast").join("config.toml");
    assert_eq!(stdout.trim(), expected.to_string_lossy());
}

#[test]
fn config_show_prints_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_acast(home.path(), &["config", "show"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("[recording]"));
    assert!(stdout.contains("[compression]"));
    assert!(stdout.contains("[playback]"));
}

#[test]
fn completions_are_generated() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_acast(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("_acast()"));
}
