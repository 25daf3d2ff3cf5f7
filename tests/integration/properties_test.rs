//! Property tests for the codec, batching and repair

use std::time::Duration;

use proptest::prelude::*;

use acast::asciicast::{payload, Frame};
use acast::batch::{self, BatchLimits};
use acast::writer::repair::repair_str;

const HEADER: &str = r#"{"version":2,"width":80,"height":24,"timestamp":1700000000}"#;

/// Any finite non-negative time, including the nanosecond-derived values
/// capture produces.
fn time() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0u64..1_000_000_000_000_000).prop_map(|ns| Duration::from_nanos(ns).as_secs_f64()),
        (0u64..100_000_000).prop_map(|us| us as f64 / 1e6),
        0.0f64..1e12,
    ]
}

/// Output frames with ascending times and a mix of repetitive and free text.
fn frames() -> impl Strategy<Value = Vec<Frame>> {
    prop::collection::vec(
        (
            1u64..2_000_000,
            prop_oneof![
                Just("progress\r".to_string()),
                Just("0123456789".to_string()),
                "[a-z \r\n]{0,40}",
            ],
        ),
        0..80,
    )
    .prop_map(|steps| {
        let mut elapsed = 0u64;
        steps
            .into_iter()
            .map(|(step, data)| {
                elapsed += step;
                Frame::output(elapsed as f64 / 1e6, data)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn raw_frames_survive_encoding(t in time(), data in "\\PC*") {
        let frame = Frame::output(t, data);
        prop_assert_eq!(Frame::from_json(&frame.to_json()).unwrap(), frame);
    }

    #[test]
    fn compressed_blocks_survive_encoding(t in time(), span in time(), bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let frame = Frame::compressed(t, t + span, payload::encode(&bytes).unwrap());
        let decoded = Frame::from_json(&frame.to_json()).unwrap();

        prop_assert_eq!(&decoded, &frame);
        let output = decoded.output_bytes().unwrap();
        prop_assert_eq!(output.as_ref(), bytes.as_slice());
    }

    #[test]
    fn partition_covers_every_frame_once(frames in frames()) {
        let limits = BatchLimits::default();
        let groups = batch::partition(&frames, &limits);

        prop_assert!(groups.iter().all(|g| !g.is_empty()));
        let rejoined: Vec<Frame> = groups.iter().flat_map(|g| g.iter().cloned()).collect();
        prop_assert_eq!(rejoined, frames);
    }

    #[test]
    fn encoding_groups_preserves_output(frames in frames()) {
        let limits = BatchLimits::default();
        let expected: String = frames.iter().map(|f| f.data.as_str()).collect();

        let mut replayed = Vec::new();
        for group in batch::partition(&frames, &limits) {
            for frame in batch::encode_group(group, limits.min_group_size).frames {
                replayed.extend_from_slice(&frame.output_bytes().unwrap());
            }
        }

        prop_assert_eq!(String::from_utf8(replayed).unwrap(), expected);
    }

    #[test]
    fn repair_is_idempotent_after_any_cut(frames in frames(), cut in any::<prop::sample::Index>()) {
        let mut content = format!("{}\n", HEADER);
        for frame in &frames {
            content.push_str(&frame.to_json());
            content.push('\n');
        }
        let bytes = content.as_bytes();
        let cut = HEADER.len() + cut.index(bytes.len() - HEADER.len() + 1);
        let damaged = String::from_utf8_lossy(&bytes[..cut]);

        let (once, first) = repair_str(&damaged).unwrap();
        let (twice, second) = repair_str(&once).unwrap();

        prop_assert_eq!(&twice, &once);
        prop_assert!(!second.rewritten);
        prop_assert_eq!(second.kept_frames, first.kept_frames);
        prop_assert!(first.kept_frames <= frames.len());
    }
}
