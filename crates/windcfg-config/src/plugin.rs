//! Plugin references and the resolvers that turn them into installed plugins.
//!
//! A config names plugins by opaque identifier. Resolution only decides whether
//! an implementation is available; what the plugin contributes is up to the
//! consuming engine.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::ThemeValue;

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// A plugin entry in the `plugins` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginRef {
    /// Bare identifier, e.g. `"daisyui"`.
    Name(String),
    /// Identifier with plugin-specific options.
    WithOptions {
        /// Plugin identifier.
        name: String,
        /// Options handed to the plugin untouched.
        #[serde(default)]
        options: BTreeMap<String, ThemeValue>,
    },
}

impl PluginRef {
    /// The plugin identifier.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::WithOptions { name, .. } => name,
        }
    }

    /// Plugin options; empty for bare references.
    pub fn options(&self) -> Option<&BTreeMap<String, ThemeValue>> {
        match self {
            Self::Name(_) => None,
            Self::WithOptions { options, .. } => Some(options),
        }
    }
}

impl From<&str> for PluginRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Descriptor of an installed plugin implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginImpl {
    /// Identifier the plugin is registered under.
    pub name: String,
    /// Installed version, if known.
    pub version: Option<String>,
    /// One-line summary of what the plugin contributes.
    pub summary: String,
}

impl PluginImpl {
    /// Descriptor with no version information.
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            summary: summary.into(),
        }
    }

    /// Attach a version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A plugin reference paired with the implementation it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlugin {
    /// The entry as written in the source.
    pub reference: PluginRef,
    /// The implementation found by the resolver.
    pub implementation: PluginImpl,
}

impl ResolvedPlugin {
    /// The plugin identifier.
    pub fn name(&self) -> &str {
        self.reference.name()
    }
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// Looks up plugin implementations by identifier.
pub trait PluginResolver {
    /// Returns the implementation registered under `name`, or `None` if it is
    /// not installed.
    fn resolve(&self, name: &str) -> Option<PluginImpl>;
}

impl<R: PluginResolver + ?Sized> PluginResolver for &R {
    fn resolve(&self, name: &str) -> Option<PluginImpl> {
        (**self).resolve(name)
    }
}

/// Errors that can occur during plugin registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A plugin with the same identifier has already been registered.
    #[error("duplicate plugin name: {0}")]
    DuplicateName(String),
}

/// Well-known plugins available to every [`PluginRegistry::with_builtin`] registry.
const BUILTIN_PLUGINS: &[(&str, &str)] = &[
    ("daisyui", "component classes and themes"),
    ("@tailwindcss/typography", "prose classes for rendered markup"),
    ("@tailwindcss/forms", "form element resets"),
    ("@tailwindcss/aspect-ratio", "aspect ratio utilities"),
    ("@tailwindcss/container-queries", "container query variants"),
];

/// In-memory resolver mapping identifiers to [`PluginImpl`] descriptors.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, PluginImpl>,
}

impl PluginRegistry {
    /// An empty registry: every reference is unresolved.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the well-known plugins pre-registered.
    pub fn with_builtin() -> Self {
        let plugins = BUILTIN_PLUGINS
            .iter()
            .map(|(name, summary)| (name.to_string(), PluginImpl::new(*name, *summary)))
            .collect();
        Self { plugins }
    }

    /// Registers a plugin implementation.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if the identifier is taken.
    pub fn register(&mut self, plugin: PluginImpl) -> Result<(), RegistryError> {
        if self.plugins.contains_key(&plugin.name) {
            return Err(RegistryError::DuplicateName(plugin.name));
        }
        self.plugins.insert(plugin.name.clone(), plugin);
        Ok(())
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PluginResolver for PluginRegistry {
    fn resolve(&self, name: &str) -> Option<PluginImpl> {
        self.plugins.get(name).cloned()
    }
}
