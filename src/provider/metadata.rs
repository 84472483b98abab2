//! Key/value package metadata as reported by a provider.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Metadata for one installed package.
///
/// Keys are the `pip show` field names (`Name`, `Version`, `Home-page`,
/// `Requires`, ...). Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    fields: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    files: Vec<String>,
}

impl PackageMetadata {
    /// Empty metadata
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style file list setter
    #[must_use]
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into().trim().to_string());
    }

    /// Parse `Key: Value` lines as printed by `pip show [-f]`.
    ///
    /// Only the first `:` separates key from value, so URLs survive. An
    /// indented block after `Files:` becomes the file list. Returns `None`
    /// for empty output, which is how pip reports an unknown package.
    #[must_use]
    pub fn parse_show_output(text: &str) -> Option<Self> {
        let mut metadata = Self::new();
        let mut in_files = false;
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.trim() == "---" {
                // pip separates multiple packages with ---; keep the first
                break;
            }
            if in_files && line.starts_with(char::is_whitespace) {
                metadata.files.push(line.trim().to_string());
                continue;
            }
            in_files = false;
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.eq_ignore_ascii_case("Files") {
                in_files = true;
                continue;
            }
            metadata.insert(key, value);
        }
        if metadata.fields.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }

    /// Raw field value; blank values count as absent
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Field value or an empty string
    #[must_use]
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("Name")
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.get("Version")
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.get("Summary")
    }

    #[must_use]
    pub fn home_page(&self) -> Option<&str> {
        self.get("Home-page")
    }

    #[must_use]
    pub fn author(&self) -> &str {
        self.get_or_empty("Author")
    }

    #[must_use]
    pub fn author_email(&self) -> &str {
        self.get_or_empty("Author-email")
    }

    #[must_use]
    pub fn license(&self) -> &str {
        self.get_or_empty("License")
    }

    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        self.get("Download-URL")
    }

    /// Install location reported by `pip show`
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.get("Location")
    }

    /// Distribution checksum, as `algorithm:hex`
    #[must_use]
    pub fn checksum(&self) -> Option<&str> {
        self.get("Checksum")
    }

    /// Direct dependency declarations from the comma-separated `Requires` field
    #[must_use]
    pub fn requires(&self) -> Vec<String> {
        self.get("Requires")
            .map(|requires| {
                requires
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Files listed by `pip show -f`, relative to [`Self::location`]
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

/// A file installed by a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    /// Path as reported, relative to the install location
    pub path: String,
    /// Absolute location on disk, when the install location is known
    pub absolute: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_OUTPUT: &str = "\
Name: requests
Version: 2.31.0
Summary: Python HTTP for Humans.
Home-page: https://requests.readthedocs.io
Author: Kenneth Reitz
Author-email: me@kennethreitz.org
License: Apache 2.0
Location: /usr/lib/python3/site-packages
Requires: certifi, charset-normalizer, idna, urllib3
Required-by:
Files:
  requests/__init__.py
  requests/api.py
";

    #[test]
    fn test_parse_show_output() {
        let metadata = PackageMetadata::parse_show_output(SHOW_OUTPUT).expect("metadata");
        assert_eq!(metadata.name(), Some("requests"));
        assert_eq!(metadata.version(), Some("2.31.0"));
        assert_eq!(metadata.home_page(), Some("https://requests.readthedocs.io"));
        assert_eq!(metadata.license(), "Apache 2.0");
        assert_eq!(
            metadata.requires(),
            vec!["certifi", "charset-normalizer", "idna", "urllib3"]
        );
        assert_eq!(metadata.get("Required-by"), None);
        assert_eq!(
            metadata.files(),
            ["requests/__init__.py", "requests/api.py"]
        );
    }

    #[test]
    fn test_empty_output_is_not_found() {
        assert!(PackageMetadata::parse_show_output("").is_none());
        assert!(PackageMetadata::parse_show_output("\n  \n").is_none());
    }

    #[test]
    fn test_empty_but_found() {
        let metadata = PackageMetadata::parse_show_output("Name: lonely\nRequires:\n")
            .expect("found");
        assert!(metadata.requires().is_empty());
    }

    #[test]
    fn test_keys_ignore_case() {
        let metadata = PackageMetadata::new().with("home-page", "https://example.org");
        assert_eq!(metadata.home_page(), Some("https://example.org"));
    }
}
