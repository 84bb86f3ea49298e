use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Class name to absolute source path. Names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassMap {
    entries: BTreeMap<String, PathBuf>,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name`, replacing any earlier path. Returns the replaced path.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.entries.insert(name.into(), path.into())
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by class name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }
}

impl<N: Into<String>, P: Into<PathBuf>> FromIterator<(N, P)> for ClassMap {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, path) in iter {
            map.insert(name, path);
        }
        map
    }
}
