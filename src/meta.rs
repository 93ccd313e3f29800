//! App plugin metadata.

use serde::{Deserialize, Serialize};

/// Metadata of an installed app plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPluginMeta {
    /// Plugin ID (e.g. `grafana-exploretraces-app`)
    pub id: String,
    /// Module path the plugin is served from
    #[serde(default)]
    pub path: String,
    /// Installed version
    pub version: String,
    /// Whether the plugin is preloaded at startup
    #[serde(default)]
    pub preload: bool,
    /// Whether the plugin still relies on the legacy angular runtime
    #[serde(default)]
    pub angular: bool,
}

impl AppPluginMeta {
    /// Create a meta with just an ID and version.
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            path: format!("public/plugins/{}/module.js", id),
            id,
            version: version.into(),
            preload: false,
            angular: false,
        }
    }

    /// Get the plugin ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the plugin version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Mark the plugin as preloaded.
    pub fn preloaded(mut self) -> Self {
        self.preload = true;
        self
    }
}
