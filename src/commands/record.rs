//! Record command handler

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use acast::asciicast::util::format_duration;
use acast::asciicast::{EnvInfo, Header};
use acast::files::filename;
use acast::{Config, Recorder};

const DEFAULT_COLS: u32 = 80;
const DEFAULT_ROWS: u32 = 24;

/// Arguments of `acast record`.
#[derive(Debug, Default)]
pub struct RecordArgs {
    pub file: Option<PathBuf>,
    pub title: Option<String>,
    pub command: Option<String>,
    pub max_wait: Option<f64>,
    pub no_compress: bool,
    /// Milliseconds between storage syncs
    pub sync_interval: Option<u64>,
    pub compress_ratio: Option<usize>,
    pub cols: Option<u32>,
    pub rows: Option<u32>,
}

#[cfg(not(tarpaulin_include))]
pub fn handle(args: RecordArgs) -> Result<()> {
    if atty::is(atty::Stream::Stdin) {
        bail!("Nothing to record: pipe terminal output into acast (e.g. `make 2>&1 | acast record`)");
    }

    let mut config = Config::load()?;
    apply_overrides(&mut config, &args);

    let path = output_path(args.file)?;
    if path.exists() {
        bail!("File already exists: {}", path.display());
    }

    let (cols, rows) = terminal_dimensions(args.cols, args.rows);
    let mut header = Header::new(cols, rows).with_env(EnvInfo::from_env());
    if let Some(title) = args.title.or_else(|| filename::title_from_path(&path)) {
        header = header.with_title(title);
    }
    if let Some(command) = args.command {
        header = header.with_command(command);
    }

    eprintln!("Recording to {}", path.display());

    let summary = Recorder::new(config).record(io::stdin().lock(), &path, &header)?;

    eprintln!(
        "Recorded {} frame(s), {} to {}",
        summary.frames,
        format_duration(summary.duration.as_secs_f64()),
        summary.path.display()
    );
    if summary.writer.compressed_blocks > 0 {
        eprintln!(
            "  {} frame(s) stored in {} compressed block(s)",
            summary.writer.frames_compressed, summary.writer.compressed_blocks
        );
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RecordArgs) {
    if let Some(max_wait) = args.max_wait {
        config.recording.max_wait = max_wait;
    }
    if args.no_compress {
        config.compression.enabled = false;
    }
    if let Some(ms) = args.sync_interval {
        config.recording.sync_interval_ms = ms;
    }
    if let Some(ratio) = args.compress_ratio {
        config.compression.ratio = ratio;
    }
}

fn output_path(file: Option<PathBuf>) -> Result<PathBuf> {
    match file {
        Some(file) => Ok(PathBuf::from(filename::with_extension(&file.to_string_lossy()))),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            Ok(filename::default_recording_path(&cwd)?)
        }
    }
}

fn terminal_dimensions(cols: Option<u32>, rows: Option<u32>) -> (u32, u32) {
    let detected = terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), terminal_size::Height(h))| (u32::from(w), u32::from(h)));

    (
        cols.or(detected.map(|(w, _)| w)).unwrap_or(DEFAULT_COLS),
        rows.or(detected.map(|(_, h)| h)).unwrap_or(DEFAULT_ROWS),
    )
}
