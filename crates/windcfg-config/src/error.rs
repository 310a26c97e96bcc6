//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur when loading, saving, or validating a build config.
///
/// Every variant aborts the load: a config either loads completely or not at all.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config source from disk.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No config file was found in the start directory or any ancestor.
    #[error("no config file found in {0} or any parent directory")]
    NotFound(PathBuf),

    /// The source could not be parsed as a structured config value.
    #[error("malformed config ({origin}): {message}")]
    MalformedConfig {
        /// Where the source came from (a path or `<inline>`).
        origin: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A plugin reference has no installed implementation.
    #[error("unresolved plugin: {0}")]
    UnresolvedPlugin(String),

    /// A content glob is not a valid pattern.
    #[error("invalid content glob {pattern:?}: {reason}")]
    InvalidGlob {
        /// The offending pattern, as written in the source.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to serialize a config document.
    #[error("failed to serialize config: {0}")]
    Serialize(String),

    /// I/O failure while enumerating content files.
    #[error("failed to scan content files: {0}")]
    Scan(#[source] glob::GlobError),
}
