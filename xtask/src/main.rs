//! Build helpers for acast.
//!
//! `cargo run -p xtask -- man [--out-dir DIR]` writes `acast.1` plus one page
//! per subcommand (`acast-record.1`, ...).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_mangen::Man;

#[derive(Parser)]
#[command(name = "xtask", about = "Development tasks for acast")]
struct Xtask {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Generate man pages
    Man {
        /// Directory to write the pages to
        #[arg(long, default_value = "target/man")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    match Xtask::parse().task {
        Task::Man { out_dir } => generate_man_pages(&out_dir),
    }
}

fn generate_man_pages(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {:?}", out_dir))?;

    let cmd = acast::cli::Cli::command();
    write_page(&cmd, &out_dir.join("acast.1"))?;

    for sub in cmd.get_subcommands() {
        write_page(sub, &out_dir.join(format!("acast-{}.1", sub.get_name())))?;
    }

    println!("Man pages written to {}", out_dir.display());
    Ok(())
}

fn write_page(cmd: &clap::Command, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    Man::new(cmd.clone())
        .render(&mut buffer)
        .with_context(|| format!("Failed to render man page for {}", cmd.get_name()))?;
    fs::write(path, buffer).with_context(|| format!("Failed to write file: {:?}", path))?;
    Ok(())
}
