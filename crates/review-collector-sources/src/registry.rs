//! Registry of review sources, keyed by name.
//!
//! New platforms plug in by implementing `ReviewSource` and registering here.
use crate::google::GoogleMapsSource;
use crate::traits::ReviewSource;
use anyhow::{anyhow, Result};
use review_collector_config::{Config, PathManager};
use std::sync::Arc;
use tracing::debug;

pub struct SourceRegistry {
    sources: Vec<Arc<dyn ReviewSource>>,
}

impl SourceRegistry {
    /// Create a registry with all built-in sources registered
    pub fn new(config: &Config, paths: &PathManager) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(GoogleMapsSource::new(config, paths)));
        registry
    }

    pub fn empty() -> Self {
        Self { sources: Vec::new() }
    }

    /// Register a source. A source with the same name replaces the old one.
    pub fn register(&mut self, source: Arc<dyn ReviewSource>) {
        self.sources.retain(|s| s.source_name() != source.source_name());
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.source_name()).collect()
    }

    pub fn by_name(&self, name: &str) -> Result<Arc<dyn ReviewSource>> {
        self.sources
            .iter()
            .find(|s| s.source_name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| anyhow!("Unknown review source '{}'. Available: {:?}", name, self.source_names()))
    }

    /// First registered source that recognises `url`
    pub fn for_url(&self, url: &str) -> Option<Arc<dyn ReviewSource>> {
        let found = self.sources.iter().find(|s| s.matches_url(url)).cloned();
        debug!(url = url, source = ?found.as_ref().map(|s| s.source_name().to_string()), "Resolved review source");
        found
    }
}
