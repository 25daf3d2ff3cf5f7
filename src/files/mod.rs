//! File naming and lookup helpers.

pub mod filename;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Resolve a recording argument, adding `.cast` when the bare name does not exist.
pub fn resolve_recording(arg: &Path) -> Result<PathBuf> {
    if arg.exists() {
        return Ok(arg.to_path_buf());
    }

    let with_ext = arg.with_extension(filename::EXTENSION);
    if arg.extension().is_none() && with_ext.exists() {
        return Ok(with_ext);
    }

    bail!("File not found: {}", arg.display())
}
