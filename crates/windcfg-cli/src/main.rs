//! `windcfg`: check, scan and scaffold utility-CSS build configs.
//!
//! Run with: `cargo run -p windcfg-cli -- check`

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use windcfg_config::{
    BuildConfig, CliArgs, ConfigDocument, ConfigError, Loader, SourceFormat, find_config,
};

/// CLI arguments for the windcfg binary.
#[derive(Parser, Debug)]
#[command(name = "windcfg", version, about = "Check and scaffold utility-CSS build configs")]
struct Args {
    #[command(flatten)]
    config: CliArgs,

    /// Also write JSON logs into this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Load and validate the config, then print a summary.
    Check,
    /// List the content files covered by the config.
    Scan,
    /// Print the theme extensions as JSON.
    Theme,
    /// Write a starter config.
    Init {
        /// Directory to write the config into.
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Write JSON instead of RON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    windcfg_log::init_logging(args.log_dir.as_deref(), args.config.log_level.as_deref());

    let result = match &args.command {
        Command::Init { dir, json } => init(dir, *json).map(|path| {
            println!("wrote {}", path.display());
        }),
        Command::Check => load(&args.config).map(|(path, config)| {
            print!("{}", summary(&path, &config));
        }),
        Command::Scan => load(&args.config).and_then(|(path, config)| scan(&path, &config)),
        Command::Theme => load(&args.config).and_then(|(_, config)| print_theme(&config)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Locate, read, override and validate the config.
fn load(args: &CliArgs) -> Result<(PathBuf, BuildConfig), ConfigError> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
                path: PathBuf::from("."),
                source,
            })?;
            find_config(&cwd)?
        }
    };

    let mut document = ConfigDocument::read(&path)?;
    document.apply_cli_overrides(args);
    let config = Loader::new().load_document(document)?;
    info!("Loaded config from {}", path.display());
    Ok((path, config))
}

/// Content globs are relative to the directory holding the config file.
fn project_root(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Print the content files covered by the config, one per line.
fn scan(path: &Path, config: &BuildConfig) -> Result<(), ConfigError> {
    let files = config.content().scan(project_root(path))?;
    info!("{} content files", files.len());
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

fn print_theme(config: &BuildConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config.theme_extensions())
        .map_err(|e| ConfigError::Serialize(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn summary(path: &Path, config: &BuildConfig) -> String {
    let mut out = format!("config:    {}\n", path.display());
    out.push_str(&format!("content:   {} glob(s)\n", config.content().len()));
    for glob in config.content_globs() {
        out.push_str(&format!("  {glob}\n"));
    }
    out.push_str(&format!(
        "preflight: {}\n",
        if config.preflight_enabled() { "on" } else { "off" }
    ));
    out.push_str(&format!("plugins:   {}\n", config.plugins().len()));
    for (i, plugin) in config.plugins().iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} ({})\n",
            i + 1,
            plugin.name(),
            plugin.implementation.summary
        ));
    }
    out.push_str(&format!(
        "theme:     {} extended categor{}\n",
        config.theme_extensions().len(),
        if config.theme_extensions().len() == 1 { "y" } else { "ies" }
    ));
    out
}

/// Write the starter config into `dir`, refusing to overwrite.
fn init(dir: &Path, json: bool) -> Result<PathBuf, ConfigError> {
    let format = if json { SourceFormat::Json } else { SourceFormat::Ron };
    let path = dir.join(format.file_name());
    if path.exists() {
        return Err(ConfigError::Write(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        )));
    }
    ConfigDocument::starter().save(&path)?;
    Ok(path)
}
