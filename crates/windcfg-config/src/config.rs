//! The loaded build config and the loader that validates sources into it.

use std::path::{Path, PathBuf};

use crate::content::ContentSet;
use crate::error::ConfigError;
use crate::plugin::{PluginRegistry, PluginResolver, ResolvedPlugin};
use crate::source::{ConfigDocument, SourceFormat, find_config};
use crate::theme::{ThemeExtensions, ThemeSection};

/// A validated build configuration.
///
/// Immutable once loaded: every glob compiled, every plugin resolved. A reload
/// produces a new value rather than mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    content: ContentSet,
    theme_extensions: ThemeExtensions,
    preflight_enabled: bool,
    plugins: Vec<ResolvedPlugin>,
}

impl BuildConfig {
    /// Load a config file, resolving plugins against the built-in registry.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Loader::new().load_path(path)
    }

    /// Compiled content globs.
    pub fn content(&self) -> &ContentSet {
        &self.content
    }

    /// Content globs exactly as written in the source, in source order.
    pub fn content_globs(&self) -> Vec<&str> {
        self.content.sources().collect()
    }

    /// Theme overrides layered onto the engine's defaults.
    pub fn theme_extensions(&self) -> &ThemeExtensions {
        &self.theme_extensions
    }

    /// Whether the engine emits its baseline normalisation styles.
    pub fn preflight_enabled(&self) -> bool {
        self.preflight_enabled
    }

    /// Resolved plugins in precedence order; later entries win on conflict.
    pub fn plugins(&self) -> &[ResolvedPlugin] {
        &self.plugins
    }

    /// Plugin identifiers in precedence order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(ResolvedPlugin::name).collect()
    }

    /// The source document this config was validated from.
    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            content: self.content.sources().map(str::to_string).collect(),
            theme: ThemeSection {
                extend: self.theme_extensions.clone(),
            },
            preflight: self.preflight_enabled,
            plugins: self.plugins.iter().map(|p| p.reference.clone()).collect(),
        }
    }

    /// Reload from `path`: returns `Some(new_config)` if the source changed, `None` otherwise.
    pub fn reload<R: PluginResolver>(
        &self,
        loader: &Loader<R>,
        path: &Path,
    ) -> Result<Option<Self>, ConfigError> {
        let new_config = loader.load_path(path)?;
        if &new_config != self {
            log::info!("Config reloaded with changes from {}", path.display());
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

/// Turns config sources into [`BuildConfig`] values.
///
/// Validation order: parse, then content globs, then plugins. The first failure
/// aborts the load.
#[derive(Debug, Clone)]
pub struct Loader<R = PluginRegistry> {
    resolver: R,
}

impl Loader<PluginRegistry> {
    /// Loader backed by the built-in plugin registry.
    pub fn new() -> Self {
        Self::with_resolver(PluginRegistry::with_builtin())
    }
}

impl Default for Loader<PluginRegistry> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: PluginResolver> Loader<R> {
    /// Loader resolving plugins through `resolver`.
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    /// The plugin resolver in use.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Load a config file; the format follows the file extension.
    pub fn load_path(&self, path: &Path) -> Result<BuildConfig, ConfigError> {
        let document = ConfigDocument::read(path)?;
        let config = self.load_document(document)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a config from in-memory source text.
    pub fn load_str(&self, text: &str, format: SourceFormat) -> Result<BuildConfig, ConfigError> {
        self.load_document(ConfigDocument::parse(text, format, "<inline>")?)
    }

    /// Find the project's config file from `start_dir` upward and load it.
    ///
    /// Returns the path that was loaded alongside the config.
    pub fn discover(&self, start_dir: &Path) -> Result<(PathBuf, BuildConfig), ConfigError> {
        let path = find_config(start_dir)?;
        let config = self.load_path(&path)?;
        Ok((path, config))
    }

    /// Validate an already-parsed document.
    pub fn load_document(&self, document: ConfigDocument) -> Result<BuildConfig, ConfigError> {
        document.check_numbers("<document>")?;
        let content = ContentSet::compile(&document.content)?;
        if content.is_empty() {
            log::warn!("Config has no content globs; no files will be scanned");
        }

        let plugins = document
            .plugins
            .into_iter()
            .map(|reference| -> Result<ResolvedPlugin, ConfigError> {
                let implementation = self
                    .resolver
                    .resolve(reference.name())
                    .ok_or_else(|| ConfigError::UnresolvedPlugin(reference.name().to_string()))?;
                log::debug!("Resolved plugin {}", reference.name());
                Ok(ResolvedPlugin {
                    reference,
                    implementation,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BuildConfig {
            content,
            theme_extensions: document.theme.extend,
            preflight_enabled: document.preflight,
            plugins,
        })
    }
}
