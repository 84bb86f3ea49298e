use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::classmap::ClassMap;
use crate::error::ScanError;
use crate::extract::extract_class_names_from_bytes;
use crate::filter::ExtensionSet;

/// Lists every scannable regular file under `root` in traversal order.
///
/// The walk is sorted by file name at each level, never follows or yields
/// symbolic links, includes hidden entries and ignores `.gitignore` rules.
/// Files whose full path is not valid UTF-8 are skipped, since the cache
/// cannot record them.
pub fn collect_source_files(root: &Path, extensions: &ExtensionSet) -> Result<Vec<PathBuf>, ScanError> {
    let meta = std::fs::metadata(root).map_err(|source| ScanError {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "scan root is not a directory"),
        });
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() || !file_type.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !extensions.is_scannable(name) {
            continue;
        }
        if entry.path().to_str().is_none() {
            warn!(path = %entry.path().display(), "Skipping source file with a non UTF-8 path");
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

/// Scans `root` and builds a fresh class map.
///
/// Later files overwrite earlier entries for the same class name, so with the
/// sorted walk the last file in traversal order wins.
pub fn scan(root: &Path, extensions: &ExtensionSet) -> Result<ClassMap, ScanError> {
    let files = collect_source_files(root, extensions)?;
    let mut map = ClassMap::new();

    for path in files.iter() {
        let bytes = std::fs::read(path).map_err(|source| ScanError {
            path: path.clone(),
            source,
        })?;
        let names = extract_class_names_from_bytes(&bytes);
        debug!(path = %path.display(), classes = names.len(), "Extracted class declarations");
        for name in names {
            if let Some(prev) = map.insert(name.as_str(), path.clone()) {
                debug!(class = %name, previous = %prev.display(), path = %path.display(), "Class declared more than once, keeping later file");
            }
        }
    }

    info!(root = %root.display(), files = files.len(), classes = map.len(), "Scanned source tree");
    Ok(map)
}

fn walk_error(root: &Path, err: ignore::Error) -> ScanError {
    let path = error_path(&err).unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    ScanError { path, source }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}
