//! Command-line interface definitions.
//!
//! Lives in the library so `xtask` can generate man pages from the same
//! definitions the binary parses.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::edit::QuantizeRange;

/// Terminal session recorder with compressed, crash-safe recordings
#[derive(Parser, Debug)]
#[command(name = "acast")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m
  some-build-step | acast record build.cast
  acast play build.cast --speed 2
  acast info build.cast
  acast repair build.cast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record terminal output read from stdin
    #[command(long_about = "Record terminal output read from stdin into a recording file.

Output is timestamped as it arrives. Idle gaps longer than --max-wait are
shortened, and bursts of similar output are stored as compressed blocks.
The file is valid at every moment: if recording is interrupted, whatever
was captured is finalized and kept.

EXAMPLES:
    make 2>&1 | acast record build.cast
    script -q /dev/null | acast record --title \"demo\"")]
    Record {
        /// Output file (default: {directory}_{date}_{time}.cast)
        file: Option<PathBuf>,
        /// Title stored in the header (default: derived from the file name)
        #[arg(short, long)]
        title: Option<String>,
        /// Command line stored in the header
        #[arg(short, long)]
        command: Option<String>,
        /// Longest idle gap kept between frames, in seconds
        #[arg(long)]
        max_wait: Option<f64>,
        /// Write every frame uncompressed
        #[arg(long)]
        no_compress: bool,
        /// Milliseconds between storage syncs
        #[arg(short = 'i', long, value_name = "MS")]
        sync_interval: Option<u64>,
        /// Target number of frames per compressed block
        #[arg(long, value_name = "FRAMES")]
        compress_ratio: Option<usize>,
        /// Terminal width stored in the header (default: current terminal)
        #[arg(long)]
        cols: Option<u32>,
        /// Terminal height stored in the header (default: current terminal)
        #[arg(long)]
        rows: Option<u32>,
    },

    /// Replay a recording in the terminal
    #[command(long_about = "Replay a recording in the terminal with its original timing.

Press Ctrl+C to stop playback.

EXAMPLES:
    acast play session.cast
    acast play session.cast --speed 3 --max-wait 1")]
    Play {
        /// Recording to play
        file: PathBuf,
        /// Speed multiplier (2 = twice as fast)
        #[arg(short, long)]
        speed: Option<f64>,
        /// Longest pause between frames, in seconds
        #[arg(long)]
        max_wait: Option<f64>,
        /// Keep every recorded pause
        #[arg(long, conflicts_with = "max_wait")]
        no_max_wait: bool,
    },

    /// Make damaged recordings replayable again
    #[command(long_about = "Make damaged recordings replayable again.

Drops frame lines that do not decode (such as a line cut off by a crash)
and sets the header duration from the last frame. Valid files are left
unchanged.

EXAMPLES:
    acast repair session.cast
    acast repair *.cast")]
    Repair {
        /// Recordings to repair
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Export commands and their output as JSON
    #[command(long_about = "Export commands and their output as JSON.

Writes an array of {\"cmd\": ..., \"out\": ...} objects. By default the
output goes next to the input with a .json extension.

EXAMPLES:
    acast export session.cast
    acast export session.cast -o commands.json")]
    Export {
        /// Recording to export
        file: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove a stretch of time from a recording
    #[command(long_about = "Remove a stretch of time from a recording.

Frames starting between --start and --end (inclusive) are dropped and
everything after moves back by the length of the cut.

EXAMPLES:
    acast cut --start 1.0 --end 5.0 in.cast out.cast")]
    Cut {
        /// Recording to edit
        input: PathBuf,
        /// Where to write the result
        output: PathBuf,
        /// Start of the cut, in seconds
        #[arg(short, long, default_value_t = 0.0)]
        start: f64,
        /// End of the cut, in seconds
        #[arg(short, long)]
        end: f64,
    },

    /// Change playback speed of a stretch of a recording
    #[command(long_about = "Change playback speed of a stretch of a recording.

Every delay between --start and --end is multiplied by --factor, so a
factor below 1 makes that part faster. Without --end the change runs to
the end of the recording.

EXAMPLES:
    acast speed --factor 0.5 in.cast out.cast
    acast speed -f 2 --start 10 --end 20 in.cast out.cast")]
    Speed {
        /// Recording to edit
        input: PathBuf,
        /// Where to write the result
        output: PathBuf,
        /// Delay multiplier
        #[arg(short, long, default_value_t = 0.7)]
        factor: f64,
        /// Start of the stretch, in seconds
        #[arg(short, long, default_value_t = 0.0)]
        start: f64,
        /// End of the stretch, in seconds
        #[arg(short, long)]
        end: Option<f64>,
    },

    /// Collapse delays into fixed lengths
    #[command(long_about = "Collapse delays into fixed lengths.

Each range is MIN or MIN,MAX in seconds. A delay of at least MIN and
below MAX becomes exactly MIN; without MAX the range has no upper bound.

EXAMPLES:
    acast quantize -r 0.5,2 -r 2 in.cast out.cast")]
    Quantize {
        /// Recording to edit
        input: PathBuf,
        /// Where to write the result
        output: PathBuf,
        /// Delay range (repeatable)
        #[arg(short, long = "ranges", value_name = "MIN[,MAX]", required = true)]
        range: Vec<QuantizeRange>,
    },

    /// Show header fields, frame counts and sizes
    Info {
        /// Recording to inspect
        file: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(long_about = "Generate shell completions.

EXAMPLES:
    acast completions bash > /etc/bash_completion.d/acast
    acast completions zsh > \"${fpath[1]}/_acast\"")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Open the configuration file in $EDITOR
    Edit,
}
