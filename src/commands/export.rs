//! Export command handler

use std::path::Path;

use anyhow::Result;

use acast::export;
use acast::files::resolve_recording;

#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path, output: Option<&Path>) -> Result<()> {
    let input = resolve_recording(file)?;
    let summary = export::export_file(&input, output)?;

    println!(
        "Exported {} command(s) to {}",
        summary.commands,
        summary.output.display()
    );
    Ok(())
}
