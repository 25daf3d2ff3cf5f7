//! Cut, speed and quantize command handlers

use std::path::Path;

use anyhow::{Context, Result};

use acast::asciicast::util::format_duration;
use acast::edit::{self, EditReport, QuantizeRange};
use acast::files::resolve_recording;
use acast::Recording;

#[cfg(not(tarpaulin_include))]
pub fn handle_cut(input: &Path, output: &Path, start: f64, end: f64) -> Result<()> {
    let report = apply(input, output, |rec| edit::cut(rec, start, end))?;
    println!("{}", describe(&report, output));
    Ok(())
}

#[cfg(not(tarpaulin_include))]
pub fn handle_speed(input: &Path, output: &Path, factor: f64, start: f64, end: Option<f64>) -> Result<()> {
    let report = apply(input, output, |rec| edit::speed(rec, factor, start, end))?;
    println!("{}", describe(&report, output));
    Ok(())
}

#[cfg(not(tarpaulin_include))]
pub fn handle_quantize(input: &Path, output: &Path, ranges: &[QuantizeRange]) -> Result<()> {
    let report = apply(input, output, |rec| edit::quantize(rec, ranges))?;
    println!("{}", describe(&report, output));
    Ok(())
}

/// Load `input`, edit it and write the result to `output`.
///
/// Nothing is written when the edit is rejected.
fn apply<F>(input: &Path, output: &Path, change: F) -> Result<EditReport>
where
    F: FnOnce(&mut Recording) -> Result<EditReport, edit::EditError>,
{
    let input = resolve_recording(input)?;
    let mut recording = Recording::load(&input)?;
    let report = change(&mut recording)?;
    recording
        .write(output)
        .with_context(|| format!("Failed to write edited recording: {:?}", output))?;
    Ok(report)
}

fn describe(report: &EditReport, output: &Path) -> String {
    let mut line = format!(
        "Wrote {} frame(s), {} to {}",
        report.frames,
        format_duration(report.duration),
        output.display()
    );
    if report.frames_removed > 0 {
        line.push_str(&format!(" ({} removed)", report.frames_removed));
    }
    line
}
