//! Reactive app plugin metadata lookups.
//!
//! Exposes "is this app plugin installed?" and "which version is
//! installed?" as hooks publishing a tri-state [`LookupResult`]
//! (pending, ready, failed) that re-runs whenever the plugin ID changes.
//!
//! # Example
//!
//! ```rust,ignore
//! use lib_plugin_meta::{use_app_plugin_version, AppPluginMeta, AppPluginRegistry, MetaConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = AppPluginRegistry::new(MetaConfig::default());
//!     registry.set_app_plugin_metas([AppPluginMeta::new("grafana-exploretraces-app", "1.2.2")])?;
//!
//!     let mut hook = use_app_plugin_version(Arc::new(registry));
//!     assert!(hook.use_plugin("grafana-exploretraces-app").loading);
//!
//!     let state = hook.settled().await;
//!     assert_eq!(state.version, Some(Some("1.2.2".into())));
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod hooks;
mod lookup;
mod meta;
mod registry;
mod source;

pub use config::*;
pub use error::*;
pub use hooks::*;
pub use lookup::*;
pub use meta::*;
pub use registry::*;
pub use source::*;
