//! Error types for scanning, caching and resolution.

use std::path::PathBuf;

/// Failures of the on-disk class map cache.
///
/// `Registry::open` recovers from every variant by rebuilding; they only
/// surface to callers of the explicit maintenance operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache file is missing or could not be opened.
    #[error("unable to read class map cache {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The cache file exists but its content is not a valid class map.
    #[error("class map cache {path} is corrupt at line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Writing, renaming or deleting the cache file failed.
    #[error("unable to write class map cache {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A directory or file under the scan root could not be read.
#[derive(Debug, thiserror::Error)]
#[error("scan failed at {path}: {source}")]
pub struct ScanError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Failure of a full rebuild (scan followed by cache save).
#[derive(Debug, thiserror::Error)]
pub enum RebuildError {
    #[error("rebuilding the class map is disabled")]
    Disabled,

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// A mapped file could not be turned into a loaded class.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} does not declare class {name}")]
    NotDeclared { name: String, path: PathBuf },
}

/// Why `Resolver::resolve` gave up on a class name.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unable to load class {name}: not in the class map and rebuilding is disabled")]
    RebuildDisabled { name: String },

    #[error("unable to load class {name}: not found even after rebuilding the class map")]
    ClassNotFound { name: String },

    #[error("unable to load class {name} from {path}: {source}")]
    LoadFailed {
        name: String,
        path: PathBuf,
        source: LoadError,
    },

    #[error("unable to load class {name}: rebuild scan failed: {source}")]
    Scan { name: String, source: ScanError },

    #[error("unable to load class {name}: {source}")]
    Cache { name: String, source: CacheError },
}

impl ResolveError {
    /// The class name whose resolution failed.
    pub fn class_name(&self) -> &str {
        match self {
            Self::RebuildDisabled { name }
            | Self::ClassNotFound { name }
            | Self::LoadFailed { name, .. }
            | Self::Scan { name, .. }
            | Self::Cache { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_names_the_class() {
        let err = ResolveError::ClassNotFound {
            name: "Alpha".to_string(),
        };
        assert_eq!(err.class_name(), "Alpha");
        assert!(err.to_string().contains("even after rebuilding"));

        let err = ResolveError::RebuildDisabled {
            name: "Beta".to_string(),
        };
        assert!(err.to_string().contains("rebuilding is disabled"));
    }

    #[test]
    fn corrupt_cache_display_includes_line() {
        let err = CacheError::Corrupt {
            path: PathBuf::from("/src/.classmapcache"),
            line: 3,
            reason: "missing tab separator".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".classmapcache"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("missing tab separator"));
    }
}
