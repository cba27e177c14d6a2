#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

use url::Url;

mod config;
mod container;
mod item;
mod location;

pub mod client;
pub mod codec;
pub mod resolver;

#[doc(hidden)]
pub mod prelude;

pub use config::{
    CONFIG_ACCESS_TOKEN, CONFIG_ENDPOINT, CONFIG_PROJECT_ID, CONFIG_TIMEOUT_SECS,
    CONFIG_USER_AGENT, DEFAULT_ENDPOINT, GcsConfig,
};
pub use container::GcsContainer;
pub use item::GcsItem;
pub use location::GcsLocation;

/// Backend kind, also the scheme of item URLs.
pub const KIND: &str = "google";

/// Tracing target for adapter operations.
pub const TRACING_TARGET: &str = "stowage_gcs";

/// Returns `true` if `url` belongs to this backend.
pub fn kind_matches(url: &Url) -> bool {
    resolver::is_gcs_url(url)
}

/// Builds a location from a configuration bag.
///
/// # Errors
///
/// Fails with [`MissingConfig`](stowage_core::ErrorKind::MissingConfig) when
/// `project_id` is absent.
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub fn make_location(
    config: &stowage_core::Config,
) -> stowage_core::Result<std::sync::Arc<dyn stowage_core::Location>> {
    let config = GcsConfig::from_config(config)?;
    Ok(std::sync::Arc::new(GcsLocation::connect(config)?))
}

/// Registry entry for this backend.
///
/// ```rust,ignore
/// use stowage_core::Registry;
///
/// let registry = Registry::new([stowage_gcs::backend()]);
/// let location = registry.dial("google", &config)?;
/// ```
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub fn backend() -> stowage_core::Backend {
    stowage_core::Backend::new(KIND, make_location, kind_matches)
}
