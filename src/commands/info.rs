//! Info command handler

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use humansize::{format_size, DECIMAL};

use acast::asciicast::util::format_duration;
use acast::files::resolve_recording;
use acast::Recording;

#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path) -> Result<()> {
    let path = resolve_recording(file)?;
    let recording = Recording::load(&path)?;
    print!("{}", render(&path, &recording));
    Ok(())
}

fn render(path: &Path, recording: &Recording) -> String {
    let header = &recording.header;
    let summary = recording.summary();
    let mut lines = vec![format!("File:        {}", path.display())];

    if let Some(title) = &header.title {
        lines.push(format!("Title:       {}", title));
    }
    if let Some(command) = &header.command {
        lines.push(format!("Command:     {}", command));
    }
    lines.push(format!("Size:        {}x{}", header.width, header.height));
    if let Some(started) = DateTime::<Utc>::from_timestamp(header.timestamp, 0) {
        lines.push(format!("Recorded:    {}", started.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.push(format!("Duration:    {}", format_duration(summary.duration)));
    lines.push(format!(
        "Frames:      {} raw, {} compressed block(s)",
        summary.raw_frames, summary.compressed_blocks
    ));
    lines.push(format!("Raw output:  {}", format_size(summary.raw_bytes, DECIMAL)));

    if summary.compressed_blocks > 0 {
        lines.push(format!(
            "Compressed:  {} stored, {} expanded",
            format_size(summary.compressed_bytes, DECIMAL),
            format_size(summary.expanded_bytes, DECIMAL)
        ));
    }
    if summary.undecodable_blocks > 0 {
        lines.push(format!("Undecodable: {} block(s)", summary.undecodable_blocks));
    }
    if summary.skipped_lines > 0 {
        lines.push(format!("Damaged:     {} line(s)", summary.skipped_lines));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
