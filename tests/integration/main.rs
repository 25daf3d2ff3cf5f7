//! Integration tests

mod helpers;

mod cli_test;
mod playback_test;
mod properties_test;
mod recording_test;
mod repair_test;
