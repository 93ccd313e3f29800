//! Plugin metadata configuration.

use std::path::PathBuf;

/// Default file name of the app plugin metas document.
pub const DEFAULT_METAS_FILE: &str = "apps.json";

/// Configuration for the app plugin registry.
#[derive(Debug, Clone)]
pub struct MetaConfig {
    /// Directory where plugins are installed
    pub plugins_dir: PathBuf,

    /// Load metas from the meta source instead of the bootstrap set
    pub use_mt_plugins: bool,

    /// Explicit metas document (None = `plugins_dir/apps.json`)
    pub metas_file: Option<PathBuf>,
}

impl MetaConfig {
    /// Create a new configuration rooted at `plugins_dir`.
    pub fn new(plugins_dir: PathBuf) -> Self {
        Self {
            plugins_dir,
            use_mt_plugins: false,
            metas_file: None,
        }
    }

    /// Toggle loading metas from the meta source.
    pub fn with_mt_plugins(mut self, enabled: bool) -> Self {
        self.use_mt_plugins = enabled;
        self
    }

    /// Set the metas document path.
    pub fn with_metas_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.metas_file = Some(path.into());
        self
    }

    /// Resolve the metas document path.
    pub fn metas_path(&self) -> PathBuf {
        self.metas_file
            .clone()
            .unwrap_or_else(|| self.plugins_dir.join(DEFAULT_METAS_FILE))
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        // Use platform-appropriate default directories
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));

        Self::new(data_dir.join("plugins"))
    }
}
