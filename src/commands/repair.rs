//! Repair command handler

use std::path::PathBuf;

use anyhow::{bail, Result};

use acast::asciicast::util::format_duration;
use acast::writer::{repair_file, RepairReport};

#[cfg(not(tarpaulin_include))]
pub fn handle(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;

    for path in files {
        match repair_file(path) {
            Ok(report) => println!("{}: {}", path.display(), describe(&report)),
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) could not be repaired", failed, files.len());
    }
    Ok(())
}

fn describe(report: &RepairReport) -> String {
    if !report.rewritten {
        return "already valid".to_string();
    }

    let mut text = format!(
        "repaired, {} frame(s), {}",
        report.kept_frames,
        format_duration(report.duration)
    );
    if report.dropped_lines > 0 {
        text.push_str(&format!(", dropped {} damaged line(s)", report.dropped_lines));
    }
    text
}
