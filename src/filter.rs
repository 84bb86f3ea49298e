use std::collections::BTreeSet;

pub const DEFAULT_EXTENSIONS: &[&str] = &["php", "php4", "php5", "mphp", "phpm"];

/// The set of file extensions the scanner reads.
///
/// Stored without the leading dot; `.src` and `src` name the same extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn is_scannable(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((_, ext)) => self.extensions.contains(ext),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}
