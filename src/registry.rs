use std::path::Path;
use tracing::{info, warn};

use crate::cache::{CacheStore, Invalidation};
use crate::classmap::ClassMap;
use crate::config::ScanConfig;
use crate::error::{CacheError, RebuildError};
use crate::scan::scan;

/// Owner of the configuration, the current class map and its cache file.
///
/// Construct one at startup and hand it to whatever needs resolution.
#[derive(Debug)]
pub struct Registry {
    config: ScanConfig,
    store: CacheStore,
    map: ClassMap,
    rebuilds: usize,
}

impl Registry {
    /// Loads the cached class map, rebuilding it when the cache is missing
    /// or unusable.
    ///
    /// When rebuilding is disabled an unusable cache leaves the registry with
    /// an empty map; every later miss then fails as `RebuildDisabled`.
    pub fn open(config: ScanConfig) -> Result<Self, RebuildError> {
        let mut registry = Self::empty(config);
        match registry.store.load() {
            Ok(map) => registry.map = map,
            Err(err) if registry.config.rebuild_permitted() => {
                warn!(error = %err, "Class map cache unusable, rebuilding");
                registry.rebuild()?;
            }
            Err(err) => {
                warn!(error = %err, "Class map cache unusable and rebuilding is disabled, starting empty");
            }
        }
        Ok(registry)
    }

    /// A registry with an empty map that never touched the cache file.
    pub fn empty(config: ScanConfig) -> Self {
        let store = CacheStore::new(config.cache_location());
        Self {
            config,
            store,
            map: ClassMap::new(),
            rebuilds: 0,
        }
    }

    /// Rescans the root, replaces the class map and saves it to the cache.
    pub fn rebuild(&mut self) -> Result<&ClassMap, RebuildError> {
        if !self.config.rebuild_permitted() {
            return Err(RebuildError::Disabled);
        }

        self.rebuilds += 1;
        info!(root = %self.config.root().display(), "Rebuilding class map");
        self.map = scan(self.config.root(), self.config.extensions())?;
        self.store.save(&self.map)?;
        Ok(&self.map)
    }

    pub fn invalidate_cache(&self) -> Result<Invalidation, CacheError> {
        self.store.invalidate()
    }

    pub fn cache_location(&self) -> &Path {
        self.store.location()
    }

    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.map.get(name)
    }

    pub fn class_map(&self) -> &ClassMap {
        &self.map
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Number of rebuilds started by this registry, including failed ones.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }
}
