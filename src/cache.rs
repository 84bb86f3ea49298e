//! Persistent class map cache.
//!
//! The cache is a single UTF-8 text file beside the scanned root. The first
//! line is a header carrying a format version and the SHA-256 of the rest of
//! the file; every following line is one `name<TAB>path` record, sorted by
//! name. Backslash, tab, CR and LF inside paths are backslash-escaped.
//!
//! ```text
//! #class-map v1 sha256=9f86d08188...
//! Alpha	/srv/app/A.src
//! Beta	/srv/app/B.src
//! ```
//!
//! Saves go through a sibling `.tmp` file that is renamed into place, so a
//! crash never leaves a truncated cache behind. Two processes saving at once
//! are not coordinated; the last rename wins.

use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classmap::ClassMap;
use crate::error::CacheError;

pub const DEFAULT_CACHE_FILE_NAME: &str = ".classmapcache";

const HEADER_PREFIX: &str = "#class-map v1 sha256=";

/// Outcome of deleting the cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Invalidation {
    Removed,
    Absent,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_root(root: &Path, file_name: &str) -> Self {
        Self::new(root.join(file_name))
    }

    pub fn location(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<ClassMap, CacheError> {
        let bytes = std::fs::read(&self.path).map_err(|source| CacheError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| self.corrupt(1, "cache is not valid UTF-8"))?;
        let map = self.decode(&text)?;
        debug!(path = %self.path.display(), classes = map.len(), "Loaded class map cache");
        Ok(map)
    }

    pub fn save(&self, map: &ClassMap) -> Result<(), CacheError> {
        let content = encode(map).map_err(|source| self.write_error(source))?;

        let mut tmp_os = self.path.as_os_str().to_os_string();
        tmp_os.push(".tmp");
        let tmp = PathBuf::from(tmp_os);

        if let Err(source) = std::fs::write(&tmp, content) {
            let _ = std::fs::remove_file(&tmp);
            return Err(CacheError::Write { path: tmp, source });
        }
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(self.write_error(source));
        }

        info!(path = %self.path.display(), classes = map.len(), "Saved class map cache");
        Ok(())
    }

    pub fn invalidate(&self) -> Result<Invalidation, CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Removed class map cache");
                Ok(Invalidation::Removed)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Invalidation::Absent),
            Err(source) => Err(self.write_error(source)),
        }
    }

    fn decode(&self, text: &str) -> Result<ClassMap, CacheError> {
        let (header, body) = text
            .split_once('\n')
            .ok_or_else(|| self.corrupt(1, "missing header line"))?;
        let expected = header
            .strip_prefix(HEADER_PREFIX)
            .ok_or_else(|| self.corrupt(1, "unrecognized header"))?;
        if expected != checksum(body) {
            return Err(self.corrupt(1, "checksum mismatch"));
        }

        let mut map = ClassMap::new();
        for (idx, line) in body.split_terminator('\n').enumerate() {
            let line_no = idx + 2;
            let (name, escaped) = line
                .split_once('\t')
                .ok_or_else(|| self.corrupt(line_no, "missing tab separator"))?;
            if name.is_empty() {
                return Err(self.corrupt(line_no, "empty class name"));
            }
            let path = unescape_path(escaped).ok_or_else(|| self.corrupt(line_no, "invalid escape in path"))?;
            let path = PathBuf::from(path);
            if !path.is_absolute() {
                return Err(self.corrupt(line_no, "path is not absolute"));
            }
            map.insert(name, path);
        }
        Ok(map)
    }

    fn corrupt(&self, line: usize, reason: &str) -> CacheError {
        CacheError::Corrupt {
            path: self.path.clone(),
            line,
            reason: reason.to_string(),
        }
    }

    fn write_error(&self, source: io::Error) -> CacheError {
        CacheError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

fn encode(map: &ClassMap) -> io::Result<String> {
    let mut body = String::new();
    for (name, path) in map.iter() {
        let path = path.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("path for class {name} is not valid UTF-8"),
            )
        })?;
        body.push_str(name);
        body.push('\t');
        escape_path_into(path, &mut body);
        body.push('\n');
    }
    Ok(format!("{HEADER_PREFIX}{}\n{body}", checksum(&body)))
}

fn checksum(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

fn escape_path_into(path: &str, out: &mut String) {
    for c in path.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

fn unescape_path(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}
