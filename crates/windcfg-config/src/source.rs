//! The raw config source: its serialized shape, formats, and on-disk location.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::plugin::PluginRef;
use crate::theme::{ThemeSection, find_non_finite_in};

/// File names searched for by [`find_config`], in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["windcfg.ron", "windcfg.json"];

/// Serialization format of a config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Rusty Object Notation (the default).
    Ron,
    /// JSON.
    Json,
}

impl SourceFormat {
    /// Pick the format from a file extension; anything but `.json` is RON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }

    /// The well-known file name for this format.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Ron => CONFIG_FILE_NAMES[0],
            Self::Json => CONFIG_FILE_NAMES[1],
        }
    }
}

fn default_preflight() -> bool {
    true
}

/// A config source as written: no validation beyond its structure.
///
/// `content` is required; every other key has a default. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Content globs, relative to the project root.
    pub content: Vec<String>,
    /// Theme section; only `extend` is recognised.
    #[serde(default)]
    pub theme: ThemeSection,
    /// Emit baseline normalisation styles.
    #[serde(default = "default_preflight")]
    pub preflight: bool,
    /// Plugin references in precedence order (later wins).
    #[serde(default)]
    pub plugins: Vec<PluginRef>,
}

impl ConfigDocument {
    /// The starter config written by `windcfg init`.
    pub fn starter() -> Self {
        Self {
            content: vec![
                "./src/**/*.{rs,html,css}".to_string(),
                "./dist/**/*.html".to_string(),
            ],
            theme: ThemeSection::default(),
            preflight: false,
            plugins: vec![PluginRef::from("daisyui")],
        }
    }

    /// Parse a document from source text.
    ///
    /// `origin` names the source in error messages.
    pub fn parse(text: &str, format: SourceFormat, origin: &str) -> Result<Self, ConfigError> {
        let malformed = |message: String| ConfigError::MalformedConfig {
            origin: origin.to_string(),
            message,
        };
        let document: Self = match format {
            SourceFormat::Ron => ron::from_str(text).map_err(|e| malformed(e.to_string()))?,
            SourceFormat::Json => serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?,
        };
        document.check_numbers(origin)?;
        Ok(document)
    }

    /// Reject NaN and infinite numbers in theme extensions and plugin options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedConfig`] naming the offending key path.
    pub fn check_numbers(&self, origin: &str) -> Result<(), ConfigError> {
        let theme = self
            .theme
            .extend
            .find_non_finite()
            .map(|path| format!("theme.extend.{path}"));
        let plugins = || {
            self.plugins.iter().find_map(|plugin| {
                let options = plugin.options()?;
                find_non_finite_in(options, &format!("plugins[{}]", plugin.name()))
            })
        };
        match theme.or_else(plugins) {
            Some(path) => Err(ConfigError::MalformedConfig {
                origin: origin.to_string(),
                message: format!("non-finite number at {path}"),
            }),
            None => Ok(()),
        }
    }

    /// Read and parse a document, picking the format from the extension.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(
            &text,
            SourceFormat::from_path(path),
            &path.display().to_string(),
        )
    }

    /// Serialize the document in the given format.
    pub fn to_source_string(&self, format: SourceFormat) -> Result<String, ConfigError> {
        match format {
            SourceFormat::Ron => {
                let pretty = ron::ser::PrettyConfig::new()
                    .depth_limit(4)
                    .separate_tuple_members(true)
                    .enumerate_arrays(false);
                ron::ser::to_string_pretty(self, pretty)
                    .map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            SourceFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Write the document to `path`, picking the format from the extension.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }
        let serialized = self.to_source_string(SourceFormat::from_path(path))?;
        std::fs::write(path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }
}

/// Find the config file for a project, starting in `start_dir` and walking up.
///
/// Within one directory, [`CONFIG_FILE_NAMES`] are tried in order.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if no ancestor contains a config file.
pub fn find_config(start_dir: &Path) -> Result<PathBuf, ConfigError> {
    // A relative start such as `.` has no ancestors of its own.
    let start = std::path::absolute(start_dir).map_err(|source| ConfigError::Read {
        path: start_dir.to_path_buf(),
        source,
    })?;
    for dir in start.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }
    Err(ConfigError::NotFound(start_dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const STARTER_RON: &str = r#"(
        content: ["./src/**/*.{rs,html,css}", "./dist/**/*.html"],
        theme: (extend: {}),
        preflight: false,
        plugins: ["daisyui"],
    )"#;

    #[test]
    fn test_parse_ron() {
        let doc = ConfigDocument::parse(STARTER_RON, SourceFormat::Ron, "<inline>").unwrap();
        assert_eq!(doc, ConfigDocument::starter());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "content": ["./src/**/*.{rs,html,css}", "./dist/**/*.html"],
            "theme": {"extend": {}},
            "preflight": false,
            "plugins": ["daisyui"]
        }"#;
        let doc = ConfigDocument::parse(json, SourceFormat::Json, "<inline>").unwrap();
        assert_eq!(doc, ConfigDocument::starter());
    }

    #[test]
    fn test_defaults_applied() {
        let doc = ConfigDocument::parse(r#"(content: ["src/*.rs"])"#, SourceFormat::Ron, "x")
            .unwrap();
        assert!(doc.preflight);
        assert!(doc.theme.extend.is_empty());
        assert!(doc.plugins.is_empty());
    }

    #[test]
    fn test_extra_field_ignored() {
        let doc = ConfigDocument::parse(
            r#"(content: [], darkMode: "class")"#,
            SourceFormat::Ron,
            "x",
        );
        assert!(doc.is_ok());
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let err = ConfigDocument::parse("(preflight: false)", SourceFormat::Ron, "cfg.ron")
            .unwrap_err();
        match err {
            ConfigError::MalformedConfig { origin, message } => {
                assert_eq!(origin, "cfg.ron");
                assert!(message.contains("content"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        for (text, format) in [("{{not valid}}", SourceFormat::Ron), ("{", SourceFormat::Json)] {
            let result = ConfigDocument::parse(text, format, "x");
            assert!(matches!(result, Err(ConfigError::MalformedConfig { .. })));
        }
    }

    #[test]
    fn test_non_finite_numbers_are_malformed() {
        let err = ConfigDocument::parse(
            r#"(content: ["src/*.rs"], theme: (extend: {"opacity": {"x": NaN}}))"#,
            SourceFormat::Ron,
            "cfg.ron",
        )
        .unwrap_err();
        match err {
            ConfigError::MalformedConfig { origin, message } => {
                assert_eq!(origin, "cfg.ron");
                assert!(message.contains("theme.extend.opacity.x"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = ConfigDocument::parse(
            r#"(content: [], plugins: [(name: "daisyui", options: {"ratio": inf})])"#,
            SourceFormat::Ron,
            "cfg.ron",
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::MalformedConfig { ref message, .. } if message.contains("plugins[daisyui].ratio"))
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("windcfg.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a/b.JSON")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("windcfg.ron")), SourceFormat::Ron);
        assert_eq!(SourceFormat::from_path(Path::new("windcfg")), SourceFormat::Ron);
    }

    #[test]
    fn test_save_and_read_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        for format in [SourceFormat::Ron, SourceFormat::Json] {
            let path = dir.path().join(format.file_name());
            ConfigDocument::starter().save(&path).unwrap();
            let loaded = ConfigDocument::read(&path).unwrap();
            assert_eq!(loaded, ConfigDocument::starter());
        }
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigDocument::read(&dir.path().join("windcfg.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_find_config_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("crates/app/src");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("windcfg.json"), "{}").unwrap();
        std::fs::write(dir.path().join("windcfg.ron"), "()").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, dir.path().join("windcfg.ron"));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("app");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("windcfg.ron"), "()").unwrap();
        std::fs::write(nested.join("windcfg.json"), "{}").unwrap();

        assert_eq!(find_config(&nested).unwrap(), nested.join("windcfg.json"));
    }

    #[test]
    #[serial]
    fn test_find_config_relative_start_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("windcfg.ron"), "()").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();
        let found = find_config(Path::new("."));
        std::env::set_current_dir(original_dir).unwrap();

        let found = found.unwrap();
        assert_eq!(found.file_name().unwrap(), "windcfg.ron");
        assert_eq!(
            found.parent().unwrap().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_find_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(ref p) if p == dir.path()));
    }
}
