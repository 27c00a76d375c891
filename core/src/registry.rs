//! Mapping from the closed [`SourceTag`] set to the adapters configured at startup.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use domov_common::listing::SourceTag;
use domov_common::source::SourceAdapter;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no adapter is configured for source '{0}'")]
    UnknownSource(SourceTag),
    #[error("source '{0}' is registered twice")]
    DuplicateSource(SourceTag),
}

#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: BTreeMap<SourceTag, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `adapter` under its own tag.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) -> Result<(), ConfigError> {
        let tag = adapter.tag();
        if self.adapters.contains_key(&tag) {
            return Err(ConfigError::DuplicateSource(tag));
        }
        self.adapters.insert(tag, adapter);
        Ok(())
    }

    pub fn with(mut self, adapter: Arc<dyn SourceAdapter>) -> Result<Self, ConfigError> {
        self.register(adapter)?;
        Ok(self)
    }

    /// Configured tags in canonical order.
    pub fn tags(&self) -> Vec<SourceTag> {
        self.adapters.keys().copied().collect()
    }

    /// Looks up every requested tag, preserving first-seen order and
    /// dropping repeats.
    ///
    /// Fails on the first tag without an adapter, before anything is invoked.
    pub fn resolve(
        &self,
        tags: &[SourceTag],
    ) -> Result<Vec<(SourceTag, Arc<dyn SourceAdapter>)>, ConfigError> {
        let mut seen = BTreeSet::new();
        tags.iter()
            .filter(|tag| seen.insert(**tag))
            .map(|tag| {
                self.adapters
                    .get(tag)
                    .map(|adapter| (*tag, Arc::clone(adapter)))
                    .ok_or(ConfigError::UnknownSource(*tag))
            })
            .collect()
    }
}
