//! Class resolution: lookup → load → rebuild → retry → fail.
//!
//! A resolve call rescans the tree at most once. Load failures on the first
//! attempt are treated like a miss, since a stale cache entry is the usual
//! cause.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{LoadError, RebuildError, ResolveError};
use crate::extract::extract_class_names_from_bytes;
use crate::registry::Registry;

/// What loading a mapped source file produced.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// Every class the file declares; all of them become defined.
    pub classes: Vec<String>,
}

/// Turns a mapped file into defined classes.
pub trait SourceLoader {
    fn load(&mut self, class_name: &str, path: &Path) -> Result<LoadedSource, LoadError>;
}

/// Reads the file and checks that it still declares the requested class.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl SourceLoader for FileLoader {
    fn load(&mut self, class_name: &str, path: &Path) -> Result<LoadedSource, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let classes = extract_class_names_from_bytes(&bytes);
        if !classes.iter().any(|c| c == class_name) {
            return Err(LoadError::NotDeclared {
                name: class_name.to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(LoadedSource { classes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    AlreadyDefined,
    Loaded,
    LoadedAfterRebuild,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub class_name: String,
    pub path: PathBuf,
    pub how: ResolvedBy,
}

enum Attempt {
    Loaded(PathBuf),
    Missing,
    Failed { path: PathBuf, source: LoadError },
}

pub struct Resolver<L = FileLoader> {
    registry: Registry,
    loader: L,
    defined: HashMap<String, PathBuf>,
}

impl Resolver<FileLoader> {
    pub fn new(registry: Registry) -> Self {
        Self::with_loader(registry, FileLoader)
    }
}

impl<L: SourceLoader> Resolver<L> {
    pub fn with_loader(registry: Registry, loader: L) -> Self {
        Self {
            registry,
            loader,
            defined: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, class_name: &str) -> Result<Resolution, ResolveError> {
        if let Some(path) = self.defined.get(class_name) {
            return Ok(Resolution {
                class_name: class_name.to_string(),
                path: path.clone(),
                how: ResolvedBy::AlreadyDefined,
            });
        }

        match self.try_load(class_name) {
            Attempt::Loaded(path) => {
                return Ok(Resolution {
                    class_name: class_name.to_string(),
                    path,
                    how: ResolvedBy::Loaded,
                });
            }
            Attempt::Missing => debug!(class = class_name, "Class not in class map"),
            Attempt::Failed { path, source } => {
                warn!(class = class_name, path = %path.display(), error = %source, "Mapped file failed to load");
            }
        }

        if !self.registry.config().rebuild_permitted() {
            return Err(ResolveError::RebuildDisabled {
                name: class_name.to_string(),
            });
        }

        self.registry.rebuild().map_err(|err| match err {
            RebuildError::Disabled => ResolveError::RebuildDisabled {
                name: class_name.to_string(),
            },
            RebuildError::Scan(source) => ResolveError::Scan {
                name: class_name.to_string(),
                source,
            },
            RebuildError::Cache(source) => ResolveError::Cache {
                name: class_name.to_string(),
                source,
            },
        })?;

        match self.try_load(class_name) {
            Attempt::Loaded(path) => Ok(Resolution {
                class_name: class_name.to_string(),
                path,
                how: ResolvedBy::LoadedAfterRebuild,
            }),
            Attempt::Missing => Err(ResolveError::ClassNotFound {
                name: class_name.to_string(),
            }),
            Attempt::Failed { path, source } => Err(ResolveError::LoadFailed {
                name: class_name.to_string(),
                path,
                source,
            }),
        }
    }

    fn try_load(&mut self, class_name: &str) -> Attempt {
        let Some(path) = self.registry.lookup(class_name).map(Path::to_path_buf) else {
            return Attempt::Missing;
        };

        match self.loader.load(class_name, &path) {
            Ok(loaded) => {
                for class in loaded.classes {
                    self.defined.entry(class).or_insert_with(|| path.clone());
                }
                self.defined.insert(class_name.to_string(), path.clone());
                debug!(class = class_name, path = %path.display(), "Loaded class");
                Attempt::Loaded(path)
            }
            Err(source) => Attempt::Failed { path, source },
        }
    }

    pub fn is_defined(&self, class_name: &str) -> bool {
        self.defined.contains_key(class_name)
    }

    pub fn defined_count(&self) -> usize {
        self.defined.len()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }
}
