//! Playback of recordings loaded from disk

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use acast::player::RecordingSleeper;
use acast::{PlaybackOptions, Player, Recording};

use super::helpers::fixtures_dir;

fn load(name: &str) -> Recording {
    Recording::load(fixtures_dir().join(name)).unwrap()
}

fn player(options: PlaybackOptions) -> Player<RecordingSleeper> {
    Player::new(options).with_sleeper(RecordingSleeper::default())
}

/// Sleeps are shortened by the real time spent writing the previous frame.
fn assert_close(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(50);
    assert!(actual <= expected, "{:?} > {:?}", actual, expected);
    assert!(actual + slack >= expected, "{:?} too short for {:?}", actual, expected);
}

#[test]
fn mixed_recording_plays_expanded_output() {
    let recording = load("mixed.cast");
    let mut out = Vec::new();

    let report = player(PlaybackOptions::default().with_max_wait(None))
        .play(&recording, &mut out)
        .unwrap();

    assert_eq!(report.frames_played, 4);
    assert_eq!(report.frames_skipped, 0);
    assert!(!report.stopped);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "$ make\r\n\
         progress 10%\rprogress 20%\rprogress 30%\rprogress 40%\rprogress 50%\r\
         done\r\n$ "
    );
}

#[test]
fn delays_follow_frame_start_times() {
    let recording = load("mixed.cast");
    let mut player = player(PlaybackOptions::default().with_max_wait(None));
    player.play(&recording, &mut Vec::new()).unwrap();

    let requests = &player.sleeper().requests;
    assert_eq!(requests.len(), 3);
    assert_close(requests[0], Duration::from_millis(250));
    assert_close(requests[1], Duration::from_millis(700));
    assert_close(requests[2], Duration::from_millis(300));
}

#[test]
fn speed_and_idle_cap_shorten_waits() {
    let recording = load("mixed.cast");
    let options = PlaybackOptions::default()
        .with_speed(2.0)
        .with_max_wait(Some(0.5));
    let mut player = player(options);
    player.play(&recording, &mut Vec::new()).unwrap();

    // Gaps are capped at 0.5s first, then halved
    let requests = &player.sleeper().requests;
    assert_close(requests[0], Duration::from_millis(125));
    assert_close(requests[1], Duration::from_millis(250));
    assert_close(requests[2], Duration::from_millis(150));
}

#[test]
fn damaged_recording_plays_what_survived() {
    let recording = load("truncated.cast");
    assert_eq!(recording.skipped_lines, 1);

    let mut out = Vec::new();
    let report = player(PlaybackOptions::default())
        .play(&recording, &mut out)
        .unwrap();

    assert_eq!(report.frames_played, 2);
    assert_eq!(out, b"first\r\nsecond\r\n");
}

#[test]
fn raised_stop_flag_plays_nothing() {
    let recording = load("sample.cast");
    let stop = Arc::new(AtomicBool::new(true));
    let mut out = Vec::new();

    let report = player(PlaybackOptions::default())
        .with_stop_flag(stop)
        .play(&recording, &mut out)
        .unwrap();

    assert!(report.stopped);
    assert_eq!(report.frames_played, 0);
    assert!(out.is_empty());
}
