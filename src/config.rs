use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_FILE_NAME;
use crate::cli::Cli;
use crate::filter::ExtensionSet;

pub const ROOT_ENV: &str = "CLASS_MAP_ROOT";

/// Immutable settings shared by the scanner, cache store and resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    root: PathBuf,
    extensions: ExtensionSet,
    rebuild_permitted: bool,
    cache_file_name: String,
}

impl ScanConfig {
    pub fn builder(root: impl Into<PathBuf>) -> ScanConfigBuilder {
        ScanConfigBuilder {
            root: root.into(),
            extensions: ExtensionSet::default(),
            rebuild_permitted: true,
            cache_file_name: DEFAULT_CACHE_FILE_NAME.to_string(),
        }
    }

    /// Absolute scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn rebuild_permitted(&self) -> bool {
        self.rebuild_permitted
    }

    pub fn cache_location(&self) -> PathBuf {
        self.root.join(&self.cache_file_name)
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfigBuilder {
    root: PathBuf,
    extensions: ExtensionSet,
    rebuild_permitted: bool,
    cache_file_name: String,
}

impl ScanConfigBuilder {
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = ExtensionSet::new(extensions);
        self
    }

    pub fn rebuild_permitted(mut self, permitted: bool) -> Self {
        self.rebuild_permitted = permitted;
        self
    }

    pub fn cache_file_name(mut self, name: impl Into<String>) -> Self {
        self.cache_file_name = name.into();
        self
    }

    /// Makes the root absolute against the current directory. Symlinks in the
    /// root path itself are kept as given.
    pub fn build(self) -> std::io::Result<ScanConfig> {
        let root = std::path::absolute(&self.root)?;
        Ok(ScanConfig {
            root,
            extensions: self.extensions,
            rebuild_permitted: self.rebuild_permitted,
            cache_file_name: self.cache_file_name,
        })
    }
}

pub fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(p) = cli.root.clone() {
        return Ok(p);
    }
    std::env::current_dir().context("Failed to resolve current directory")
}

pub fn scan_config_from_cli(cli: &Cli) -> Result<ScanConfig> {
    let root = resolve_root(cli)?;
    let mut builder = ScanConfig::builder(&root).rebuild_permitted(!cli.no_rebuild);
    if !cli.ext.is_empty() {
        builder = builder.extensions(&cli.ext);
    }
    builder
        .build()
        .with_context(|| format!("Failed to resolve scan root: {}", root.display()))
}
