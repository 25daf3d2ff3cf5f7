//! Play command handler

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use acast::files::resolve_recording;
use acast::{Config, PlaybackOptions, Player, Recording};

#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path, speed: Option<f64>, max_wait: Option<f64>, no_max_wait: bool) -> Result<()> {
    let config = Config::load()?;
    let path = resolve_recording(file)?;
    let recording = Recording::load(&path)?;

    let options = playback_options(&config, speed, max_wait, no_max_wait);

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    if let Err(err) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!(error = %err, "could not install Ctrl+C handler");
    }

    let mut player = Player::new(options).with_stop_flag(stop);
    let mut stdout = io::stdout().lock();
    let report = player
        .play(&recording, &mut stdout)
        .with_context(|| format!("Failed to play {:?}", path))?;

    if report.stopped {
        eprintln!("\nPlayback stopped");
    }
    if report.frames_skipped > 0 {
        eprintln!("Skipped {} undecodable block(s)", report.frames_skipped);
    }
    if recording.skipped_lines > 0 {
        eprintln!("Skipped {} damaged line(s); try `acast repair`", recording.skipped_lines);
    }

    Ok(())
}

fn playback_options(
    config: &Config,
    speed: Option<f64>,
    max_wait: Option<f64>,
    no_max_wait: bool,
) -> PlaybackOptions {
    let mut options = PlaybackOptions::from_config(&config.playback);
    if let Some(speed) = speed {
        options.speed = speed;
    }
    if no_max_wait {
        options.max_wait = None;
    } else if max_wait.is_some() {
        options.max_wait = max_wait;
    }
    options
}
