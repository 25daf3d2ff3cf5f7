//! Subcommand handlers

pub mod completions;
pub mod config;
pub mod edit;
pub mod export;
pub mod info;
pub mod play;
pub mod record;
pub mod repair;
