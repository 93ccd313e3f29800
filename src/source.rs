//! Sources the registry can load app plugin metas from.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::meta::AppPluginMeta;

/// Something that can produce the full set of app plugin metas.
#[async_trait]
pub trait MetaSource: Send + Sync {
    /// Load every known app plugin meta.
    async fn load(&self) -> Result<Vec<AppPluginMeta>>;
}

/// Fixed, in-memory set of metas.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    metas: Vec<AppPluginMeta>,
}

impl StaticSource {
    /// Create a source that always yields `metas`.
    pub fn new(metas: Vec<AppPluginMeta>) -> Self {
        Self { metas }
    }
}

#[async_trait]
impl MetaSource for StaticSource {
    async fn load(&self) -> Result<Vec<AppPluginMeta>> {
        Ok(self.metas.clone())
    }
}

/// JSON document holding an array of metas.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the metas document.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl MetaSource for FileSource {
    async fn load(&self) -> Result<Vec<AppPluginMeta>> {
        tracing::debug!("Loading app plugin metas from {}", self.path.display());

        let raw = tokio::fs::read_to_string(&self.path).await?;
        let metas: Vec<AppPluginMeta> = serde_json::from_str(&raw)?;

        tracing::debug!("Loaded {} app plugin metas", metas.len());
        Ok(metas)
    }
}
