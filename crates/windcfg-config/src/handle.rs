//! Shared access to the current config across build passes.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::{BuildConfig, Loader};
use crate::error::ConfigError;
use crate::plugin::PluginResolver;

/// Holds the config the next build pass should read.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it for the whole
/// pass. Reloads build the new record completely before publishing it, so a
/// reader sees either the old record or the new one, never a mix.
#[derive(Debug)]
pub struct ConfigHandle {
    current: RwLock<Arc<BuildConfig>>,
    /// Serialises load-compare-swap sequences.
    reload_lock: Mutex<()>,
}

impl ConfigHandle {
    /// Wrap an already loaded config.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            reload_lock: Mutex::new(()),
        }
    }

    /// The config currently published.
    pub fn snapshot(&self) -> Arc<BuildConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publish `config`, returning the record it replaced.
    pub fn replace(&self, config: BuildConfig) -> Arc<BuildConfig> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(Arc::new(config))
    }

    /// Reload from `path` and publish the result if it differs.
    ///
    /// Returns `true` if a new record was published. On error the current
    /// record stays in place.
    pub fn reload_from<R: PluginResolver>(
        &self,
        loader: &Loader<R>,
        path: &Path,
    ) -> Result<bool, ConfigError> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        match current.reload(loader, path) {
            Ok(Some(config)) => {
                self.swap(Arc::new(config));
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                log::warn!("Keeping previous config: {e}");
                Err(e)
            }
        }
    }

    fn swap(&self, config: Arc<BuildConfig>) -> Arc<BuildConfig> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, config)
    }
}
