//! Explicit backend registry.
//!
//! Backends are described by plain function values and collected into a
//! [`Registry`] where the application is composed. Nothing registers itself
//! at load time.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::{Config, Error, Location, Result, TRACING_TARGET};

/// Builds a location from its configuration.
pub type MakeFn = fn(&Config) -> Result<Arc<dyn Location>>;

/// Decides whether a URL belongs to a backend.
pub type MatchFn = fn(&Url) -> bool;

/// A storage backend: its kind name, factory and URL predicate.
#[derive(Clone, Copy)]
pub struct Backend {
    kind: &'static str,
    make: MakeFn,
    matches: MatchFn,
}

impl Backend {
    /// Describes a backend.
    pub const fn new(kind: &'static str, make: MakeFn, matches: MatchFn) -> Self {
        Self {
            kind,
            make,
            matches,
        }
    }

    /// Kind name, e.g. `"google"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns `true` if `url` belongs to this backend.
    pub fn matches(&self, url: &Url) -> bool {
        (self.matches)(url)
    }

    /// Builds a location for this backend.
    pub fn make(&self, config: &Config) -> Result<Arc<dyn Location>> {
        (self.make)(config)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Statically assembled set of backends, looked up by kind or by URL.
///
/// # Examples
///
/// ```rust,ignore
/// use stowage_core::{Config, Registry};
///
/// let registry = Registry::new([stowage_gcs::backend()]);
/// let config = Config::new().with("project_id", "acme");
/// let location = registry.dial("google", &config)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    backends: Vec<Backend>,
}

impl Registry {
    /// Creates a registry from a list of backends.
    ///
    /// A later backend with the same kind replaces an earlier one.
    pub fn new(backends: impl IntoIterator<Item = Backend>) -> Self {
        backends
            .into_iter()
            .fold(Self::default(), |registry, backend| registry.with(backend))
    }

    /// Adds a backend, replacing any backend of the same kind.
    #[must_use]
    pub fn with(mut self, backend: Backend) -> Self {
        match self.backends.iter_mut().find(|b| b.kind == backend.kind) {
            Some(existing) => *existing = backend,
            None => self.backends.push(backend),
        }
        self
    }

    /// Registered kind names in registration order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.backends.iter().map(Backend::kind).collect()
    }

    /// Returns the backend registered under `kind`.
    pub fn backend(&self, kind: &str) -> Option<&Backend> {
        self.backends.iter().find(|b| b.kind == kind)
    }

    /// Returns the kind of the first backend that accepts `url`.
    pub fn kind_for_url(&self, url: &Url) -> Option<&'static str> {
        self.backends
            .iter()
            .find(|b| b.matches(url))
            .map(Backend::kind)
    }

    /// Builds a location for the backend registered under `kind`.
    pub fn dial(&self, kind: &str, config: &Config) -> Result<Arc<dyn Location>> {
        let backend = self.backend(kind).ok_or_else(|| {
            Error::unknown_kind().with_message(format!("no backend registered for kind '{kind}'"))
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            kind = backend.kind,
            "Dialling storage location"
        );

        backend.make(config)
    }

    /// Builds a location for the backend that owns `url`.
    pub fn dial_url(&self, url: &Url, config: &Config) -> Result<Arc<dyn Location>> {
        let kind = self.kind_for_url(url).ok_or_else(|| {
            Error::unknown_kind()
                .with_message(format!("no backend accepts scheme '{}'", url.scheme()))
        })?;
        self.dial(kind, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Container, Cursor, ErrorKind, Item, Page};

    #[derive(Debug)]
    struct NullLocation;

    #[async_trait::async_trait]
    impl Location for NullLocation {
        async fn create_container(&self, _name: &str) -> Result<Box<dyn Container>> {
            Err(Error::backend())
        }

        async fn containers(
            &self,
            _prefix: &str,
            _cursor: &Cursor,
            _count: usize,
        ) -> Result<Page<Box<dyn Container>>> {
            Ok(Page::new(Vec::new(), Cursor::start()))
        }

        async fn container(&self, _id: &str) -> Result<Box<dyn Container>> {
            Err(Error::not_found())
        }

        async fn remove_container(&self, _id: &str) -> Result<()> {
            Ok(())
        }

        async fn item_by_url(&self, _url: &Url) -> Result<Box<dyn Item>> {
            Err(Error::not_found())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn make_null(config: &Config) -> Result<Arc<dyn Location>> {
        config
            .get("project_id")
            .ok_or_else(Error::missing_config)?;
        Ok(Arc::new(NullLocation))
    }

    fn null_backend(kind: &'static str, scheme_matches: MatchFn) -> Backend {
        Backend::new(kind, make_null, scheme_matches)
    }

    fn is_null(url: &Url) -> bool {
        url.scheme() == "null"
    }

    fn is_void(url: &Url) -> bool {
        url.scheme() == "void"
    }

    #[test]
    fn test_kinds_keep_registration_order() {
        let registry = Registry::new([null_backend("null", is_null), null_backend("void", is_void)]);
        assert_eq!(registry.kinds(), vec!["null", "void"]);
    }

    #[test]
    fn test_same_kind_replaces() {
        let registry = Registry::new([null_backend("null", is_null), null_backend("null", is_void)]);
        assert_eq!(registry.kinds(), vec!["null"]);

        let url = Url::parse("void://host/path").unwrap();
        assert_eq!(registry.kind_for_url(&url), Some("null"));
    }

    #[test]
    fn test_kind_for_url() {
        let registry = Registry::new([null_backend("null", is_null)]);

        let url = Url::parse("null://host/a/b").unwrap();
        assert_eq!(registry.kind_for_url(&url), Some("null"));

        let url = Url::parse("https://host/a/b").unwrap();
        assert_eq!(registry.kind_for_url(&url), None);
    }

    #[tokio::test]
    async fn test_dial() {
        let registry = Registry::new([null_backend("null", is_null)]);
        let config = Config::new().with("project_id", "p");

        let location = registry.dial("null", &config).unwrap();
        location.close().await.unwrap();

        let err = registry.dial("null", &Config::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingConfig);
    }

    #[test]
    fn test_dial_unknown_kind() {
        let registry = Registry::default();
        let err = registry.dial("google", &Config::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownKind);
    }

    #[test]
    fn test_dial_url() {
        let registry = Registry::new([null_backend("null", is_null)]);
        let config = Config::new().with("project_id", "p");

        let url = Url::parse("null://host/x").unwrap();
        assert!(registry.dial_url(&url, &config).is_ok());

        let url = Url::parse("ftp://host/x").unwrap();
        let err = registry.dial_url(&url, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownKind);
    }
}
