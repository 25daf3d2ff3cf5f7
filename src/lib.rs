//! acast - terminal session recorder
//!
//! Captures terminal output as timestamped frames, batches similar frames
//! into compressed blocks while recording, keeps the file valid if the
//! process dies mid-write, and replays recordings with their original timing.

pub mod asciicast;
pub mod batch;
pub mod capture;
pub mod cli;
pub mod config;
pub mod edit;
pub mod export;
pub mod files;
pub mod player;
pub mod recorder;
pub mod writer;

pub use asciicast::{Frame, FrameKind, Header, Recording};
pub use capture::CaptureStream;
pub use config::Config;
pub use player::{PlaybackOptions, Player};
pub use recorder::Recorder;
pub use writer::{StreamWriter, WriterOptions};
