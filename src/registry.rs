//! App plugin meta registry.
//!
//! The registry answers "is this app plugin installed?" and "which version
//! is installed?" for the lookup hooks. Metas are either seeded directly
//! (the bootstrap set) or, with `use_mt_plugins` enabled, loaded once from
//! a [`MetaSource`] on first lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::config::MetaConfig;
use crate::error::{MetaError, Result};
use crate::meta::AppPluginMeta;
use crate::source::{FileSource, MetaSource};

/// Async lookups the plugin meta hooks are built on.
///
/// Unknown plugin IDs resolve to `false` / `None`; errors are reserved for
/// lookups that could not be performed at all.
#[async_trait]
pub trait AppPluginMetas: Send + Sync {
    /// Check whether an app plugin is installed.
    async fn is_app_plugin_installed(&self, plugin_id: &str) -> Result<bool>;

    /// Get the installed version of an app plugin.
    async fn get_app_plugin_version(&self, plugin_id: &str) -> Result<Option<String>>;
}

/// Thread-safe app plugin meta registry.
pub struct AppPluginRegistry {
    config: MetaConfig,
    metas: RwLock<HashMap<String, AppPluginMeta>>,
    source: Arc<dyn MetaSource>,
    loaded: AtomicBool,
    load_lock: tokio::sync::Mutex<()>,
}

impl AppPluginRegistry {
    /// Create a registry reading metas from the configured metas file.
    pub fn new(config: MetaConfig) -> Self {
        let source = Arc::new(FileSource::new(config.metas_path()));
        Self::with_source(config, source)
    }

    /// Create a registry with a custom meta source.
    pub fn with_source(config: MetaConfig, source: Arc<dyn MetaSource>) -> Self {
        Self {
            config,
            metas: RwLock::new(HashMap::new()),
            source,
            loaded: AtomicBool::new(false),
            load_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    /// Replace the known metas.
    ///
    /// Seeded metas also satisfy the lazy load, so the meta source is not
    /// consulted afterwards.
    pub fn set_app_plugin_metas(&self, metas: impl IntoIterator<Item = AppPluginMeta>) -> Result<()> {
        let metas: HashMap<String, AppPluginMeta> =
            metas.into_iter().map(|m| (m.id.clone(), m)).collect();

        tracing::debug!("Seeding {} app plugin metas", metas.len());

        let mut current = self.metas.write().map_err(|_| MetaError::LockPoisoned)?;
        *current = metas;
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    /// Get the meta of an app plugin.
    pub async fn get_app_plugin_meta(&self, plugin_id: &str) -> Result<Option<AppPluginMeta>> {
        if plugin_id.is_empty() {
            return Err(MetaError::InvalidPluginId(plugin_id.to_string()));
        }

        self.ensure_loaded().await?;

        Ok(self
            .metas
            .read()
            .map_err(|_| MetaError::LockPoisoned)?
            .get(plugin_id)
            .cloned())
    }

    /// List all known metas.
    ///
    /// A poisoned lock reads as empty, like [`len`](Self::len).
    pub fn list(&self) -> Vec<AppPluginMeta> {
        self.metas
            .read()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the number of known metas.
    pub fn len(&self) -> usize {
        self.metas.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load metas from the source once, when `use_mt_plugins` is on.
    async fn ensure_loaded(&self) -> Result<()> {
        if !self.config.use_mt_plugins || self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        let _guard = self.load_lock.lock().await;
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        let metas = self.source.load().await.map_err(|e| {
            tracing::warn!("Failed to load app plugin metas: {}", e);
            MetaError::SourceFailed(e.to_string())
        })?;

        tracing::debug!("Loaded {} app plugin metas from source", metas.len());

        let mut current = self.metas.write().map_err(|_| MetaError::LockPoisoned)?;
        // Seeded while the source was loading; the seed wins.
        if self.loaded.load(Ordering::Acquire) {
            tracing::debug!("Discarding source metas, registry was seeded during load");
            return Ok(());
        }
        *current = metas.into_iter().map(|m| (m.id.clone(), m)).collect();
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }
}

impl Default for AppPluginRegistry {
    fn default() -> Self {
        Self::new(MetaConfig::default())
    }
}

#[async_trait]
impl AppPluginMetas for AppPluginRegistry {
    async fn is_app_plugin_installed(&self, plugin_id: &str) -> Result<bool> {
        Ok(self.get_app_plugin_meta(plugin_id).await?.is_some())
    }

    async fn get_app_plugin_version(&self, plugin_id: &str) -> Result<Option<String>> {
        Ok(self.get_app_plugin_meta(plugin_id).await?.map(|m| m.version))
    }
}
