//! Command-line argument parsing for windcfg.

use std::path::PathBuf;

use clap::Parser;

use crate::source::ConfigDocument;

/// Config-related command-line arguments.
///
/// CLI values override settings read from the config source. Overrides are
/// applied before validation, so overridden globs are checked like any other.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "windcfg", about = "Utility-CSS build config")]
pub struct CliArgs {
    /// Path to the config file (default: search upward for windcfg.ron / windcfg.json).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Replace the content globs (repeatable).
    #[arg(long = "content", value_name = "GLOB")]
    pub content: Vec<String>,

    /// Enable or disable preflight.
    #[arg(long)]
    pub preflight: Option<bool>,

    /// Log filter (error, warn, info, debug, trace, or a RUST_LOG directive).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ConfigDocument {
    /// Apply CLI overrides to a parsed document.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if !args.content.is_empty() {
            self.content = args.content.clone();
        }
        if let Some(preflight) = args.preflight {
            self.preflight = preflight;
        }
    }
}
