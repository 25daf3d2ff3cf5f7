//! acast CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use acast::cli::{Cli, Commands, ConfigCommands};

/// Environment variable holding the log filter (e.g. `ACAST_LOG=debug`)
const LOG_ENV: &str = "ACAST_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stderr keeps log lines out of replayed output on stdout
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            file,
            title,
            command,
            max_wait,
            no_compress,
            sync_interval,
            compress_ratio,
            cols,
            rows,
        } => commands::record::handle(commands::record::RecordArgs {
            file,
            title,
            command,
            max_wait,
            no_compress,
            sync_interval,
            compress_ratio,
            cols,
            rows,
        }),
        Commands::Play {
            file,
            speed,
            max_wait,
            no_max_wait,
        } => commands::play::handle(&file, speed, max_wait, no_max_wait),
        Commands::Repair { files } => commands::repair::handle(&files),
        Commands::Export { file, output } => commands::export::handle(&file, output.as_deref()),
        Commands::Cut {
            input,
            output,
            start,
            end,
        } => commands::edit::handle_cut(&input, &output, start, end),
        Commands::Speed {
            input,
            output,
            factor,
            start,
            end,
        } => commands::edit::handle_speed(&input, &output, factor, start, end),
        Commands::Quantize {
            input,
            output,
            range,
        } => commands::edit::handle_quantize(&input, &output, &range),
        Commands::Info { file } => commands::info::handle(&file),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Path => commands::config::handle_path(),
            ConfigCommands::Edit => commands::config::handle_edit(),
        },
        Commands::Completions { shell } => commands::completions::handle(shell),
    }
}
