//! Build configuration for a utility-CSS generation step.
//!
//! A config names the files to scan for class usage, theme extensions layered
//! onto the engine's built-in tokens, whether baseline normalisation
//! (preflight) is emitted, and the styling plugins to register. Sources are
//! RON or JSON; loading validates every glob and resolves every plugin, or
//! fails as a whole.

mod cli;
mod config;
mod content;
mod error;
mod handle;
mod plugin;
mod source;
mod theme;

pub use cli::CliArgs;
pub use config::{BuildConfig, Loader};
pub use content::{ContentGlob, ContentSet};
pub use error::ConfigError;
pub use handle::ConfigHandle;
pub use plugin::{
    PluginImpl, PluginRef, PluginRegistry, PluginResolver, RegistryError, ResolvedPlugin,
};
pub use source::{CONFIG_FILE_NAMES, ConfigDocument, SourceFormat, find_config};
pub use theme::{ThemeExtensions, ThemeSection, ThemeValue};
