//! Lookup hooks for app plugin install status and version.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::MetaError;
use crate::lookup::{AsyncLookup, LookupResult};
use crate::registry::AppPluginMetas;

/// Snapshot of [`AppPluginInstalled`].
#[derive(Debug, Clone)]
pub struct AppPluginInstalledState {
    pub loading: bool,
    pub error: Option<Arc<MetaError>>,
    pub installed: Option<bool>,
}

impl From<LookupResult<bool>> for AppPluginInstalledState {
    fn from(result: LookupResult<bool>) -> Self {
        let (loading, error, installed) = split(result);
        Self {
            loading,
            error,
            installed,
        }
    }
}

/// Snapshot of [`AppPluginVersion`].
#[derive(Debug, Clone)]
pub struct AppPluginVersionState {
    pub loading: bool,
    pub error: Option<Arc<MetaError>>,
    /// `Some(None)` means the plugin is not installed.
    pub version: Option<Option<String>>,
}

impl From<LookupResult<Option<String>>> for AppPluginVersionState {
    fn from(result: LookupResult<Option<String>>) -> Self {
        let (loading, error, version) = split(result);
        Self {
            loading,
            error,
            version,
        }
    }
}

fn split<T>(result: LookupResult<T>) -> (bool, Option<Arc<MetaError>>, Option<T>) {
    match result {
        LookupResult::Pending => (true, None, None),
        LookupResult::Ready(value) => (false, None, Some(value)),
        LookupResult::Failed(e) => (false, Some(e), None),
    }
}

/// Tracks whether an app plugin is installed.
pub struct AppPluginInstalled {
    lookup: AsyncLookup<bool>,
}

impl AppPluginInstalled {
    /// Request the install status of `plugin_id`.
    pub fn use_plugin(&mut self, plugin_id: &str) -> AppPluginInstalledState {
        self.lookup.use_key(plugin_id).into()
    }

    /// Current install status.
    pub fn state(&self) -> AppPluginInstalledState {
        self.lookup.current().into()
    }

    /// Wait for the current request to settle.
    pub async fn settled(&self) -> AppPluginInstalledState {
        self.lookup.settled().await.into()
    }

    /// Subscribe to raw result changes.
    pub fn subscribe(&self) -> watch::Receiver<LookupResult<bool>> {
        self.lookup.subscribe()
    }
}

/// Tracks the installed version of an app plugin.
pub struct AppPluginVersion {
    lookup: AsyncLookup<Option<String>>,
}

impl AppPluginVersion {
    /// Request the installed version of `plugin_id`.
    pub fn use_plugin(&mut self, plugin_id: &str) -> AppPluginVersionState {
        self.lookup.use_key(plugin_id).into()
    }

    /// Current version state.
    pub fn state(&self) -> AppPluginVersionState {
        self.lookup.current().into()
    }

    /// Wait for the current request to settle.
    pub async fn settled(&self) -> AppPluginVersionState {
        self.lookup.settled().await.into()
    }

    /// Subscribe to raw result changes.
    pub fn subscribe(&self) -> watch::Receiver<LookupResult<Option<String>>> {
        self.lookup.subscribe()
    }
}

/// Create an install-status hook backed by `metas`.
pub fn use_app_plugin_installed(metas: Arc<dyn AppPluginMetas>) -> AppPluginInstalled {
    AppPluginInstalled {
        lookup: AsyncLookup::new(move |plugin_id: String| {
            let metas = metas.clone();
            async move { metas.is_app_plugin_installed(&plugin_id).await }
        }),
    }
}

/// Create a version hook backed by `metas`.
pub fn use_app_plugin_version(metas: Arc<dyn AppPluginMetas>) -> AppPluginVersion {
    AppPluginVersion {
        lookup: AsyncLookup::new(move |plugin_id: String| {
            let metas = metas.clone();
            async move { metas.get_app_plugin_version(&plugin_id).await }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use async_trait::async_trait;

    use crate::config::MetaConfig;
    use crate::error::Result;
    use crate::meta::AppPluginMeta;
    use crate::registry::AppPluginRegistry;

    fn registry() -> Arc<dyn AppPluginMetas> {
        let registry = AppPluginRegistry::new(MetaConfig::new(PathBuf::from("/nonexistent")));
        registry
            .set_app_plugin_metas(vec![
                AppPluginMeta::new("grafana-exploretraces-app", "1.2.2").preloaded(),
                AppPluginMeta::new("grafana-lokiexplore-app", "1.0.9"),
            ])
            .unwrap();
        Arc::new(registry)
    }

    struct FailingMetas;

    #[async_trait]
    impl AppPluginMetas for FailingMetas {
        async fn is_app_plugin_installed(&self, _plugin_id: &str) -> Result<bool> {
            Err(MetaError::lookup("Some error"))
        }

        async fn get_app_plugin_version(&self, _plugin_id: &str) -> Result<Option<String>> {
            Err(MetaError::lookup("Some error"))
        }
    }

    mod installed {
        use super::*;

        #[tokio::test]
        async fn test_default_values() {
            let mut hook = use_app_plugin_installed(registry());
            let state = hook.use_plugin("grafana-exploretraces-app");

            assert!(state.loading);
            assert!(state.error.is_none());
            assert!(state.installed.is_none());
        }

        #[tokio::test]
        async fn test_values_after_loading() {
            let mut hook = use_app_plugin_installed(registry());
            hook.use_plugin("grafana-exploretraces-app");
            let state = hook.settled().await;

            assert!(!state.loading);
            assert!(state.error.is_none());
            assert_eq!(state.installed, Some(true));
        }

        #[tokio::test]
        async fn test_unknown_plugin() {
            let mut hook = use_app_plugin_installed(registry());
            hook.use_plugin("otherorg-otherplugin-app");
            let state = hook.settled().await;

            assert!(!state.loading);
            assert!(state.error.is_none());
            assert_eq!(state.installed, Some(false));
        }

        #[tokio::test]
        async fn test_lookup_error() {
            let mut hook = use_app_plugin_installed(Arc::new(FailingMetas));
            hook.use_plugin("otherorg-otherplugin-app");
            let state = hook.settled().await;

            assert!(!state.loading);
            assert!(matches!(
                state.error.as_deref(),
                Some(MetaError::LookupFailed(msg)) if msg == "Some error"
            ));
            assert!(state.installed.is_none());
        }

        #[tokio::test]
        async fn test_state_matches_settled() {
            let mut hook = use_app_plugin_installed(registry());
            hook.use_plugin("grafana-lokiexplore-app");
            hook.settled().await;

            assert_eq!(hook.state().installed, Some(true));
            assert!(hook.subscribe().borrow().is_settled());
        }
    }

    mod version {
        use super::*;

        #[tokio::test]
        async fn test_default_values() {
            let mut hook = use_app_plugin_version(registry());
            let state = hook.use_plugin("grafana-exploretraces-app");

            assert!(state.loading);
            assert!(state.error.is_none());
            assert!(state.version.is_none());
        }

        #[tokio::test]
        async fn test_values_after_loading() {
            let mut hook = use_app_plugin_version(registry());
            hook.use_plugin("grafana-exploretraces-app");
            let state = hook.settled().await;

            assert!(!state.loading);
            assert!(state.error.is_none());
            assert_eq!(state.version, Some(Some("1.2.2".to_string())));
        }

        #[tokio::test]
        async fn test_unknown_plugin() {
            let mut hook = use_app_plugin_version(registry());
            hook.use_plugin("otherorg-otherplugin-app");
            let state = hook.settled().await;

            assert!(!state.loading);
            assert!(state.error.is_none());
            assert_eq!(state.version, Some(None));
        }

        #[tokio::test]
        async fn test_lookup_error() {
            let mut hook = use_app_plugin_version(Arc::new(FailingMetas));
            hook.use_plugin("otherorg-otherplugin-app");
            let state = hook.settled().await;

            assert!(!state.loading);
            assert_eq!(
                state.error.map(|e| e.to_string()).as_deref(),
                Some("Lookup failed: Some error")
            );
            assert!(state.version.is_none());
        }

        #[tokio::test]
        async fn test_switching_plugins() {
            let mut hook = use_app_plugin_version(registry());
            hook.use_plugin("grafana-exploretraces-app");
            hook.settled().await;

            assert!(hook.use_plugin("grafana-lokiexplore-app").loading);
            let state = hook.settled().await;
            assert_eq!(state.version, Some(Some("1.0.9".to_string())));
        }
    }
}
