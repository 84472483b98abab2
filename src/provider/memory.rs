//! Frozen, in-memory metadata.

use super::{InstalledFile, MetadataProvider, PackageMetadata};
use crate::error::{ProviderErrorKind, Result, SbomError};
use crate::model::normalize_name;
use indexmap::IndexMap;
use std::path::Path;

/// Metadata held in memory, keyed by normalized package name.
///
/// Loaded from a JSON snapshot such as
///
/// ```json
/// {
///   "alpha": { "Name": "alpha", "Version": "1.0", "License": "MIT", "Requires": "beta" },
///   "beta":  { "Name": "beta", "Version": "2.0", "Requires": ["alpha"] }
/// }
/// ```
///
/// List values are joined with `, `; a `Files` list becomes the file list.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    packages: IndexMap<String, PackageMetadata>,
}

impl MemoryProvider {
    /// Empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a package
    pub fn insert(&mut self, metadata: PackageMetadata) {
        if let Some(name) = metadata.name() {
            self.packages.insert(normalize_name(name), metadata);
        }
    }

    /// Builder-style [`Self::insert`]
    #[must_use]
    pub fn with(mut self, metadata: PackageMetadata) -> Self {
        self.insert(metadata);
        self
    }

    /// Number of packages
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the provider knows no packages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: IndexMap<String, IndexMap<String, serde_json::Value>> = serde_json::from_str(json)
            .map_err(|e| {
                SbomError::provider(
                    "parsing metadata snapshot",
                    ProviderErrorKind::InvalidMetadata(e.to_string()),
                )
            })?;

        let mut provider = Self::new();
        for (key, fields) in raw {
            let mut metadata = PackageMetadata::new();
            let mut files = Vec::new();
            for (field, value) in fields {
                if field.eq_ignore_ascii_case("Files") {
                    files = value_list(&value);
                    continue;
                }
                metadata.insert(field, value_text(&value));
            }
            if metadata.name().is_none() {
                metadata.insert("Name", key.clone());
            }
            provider.insert(metadata.with_files(files));
        }
        Ok(provider)
    }

    /// Load a JSON snapshot from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SbomError::io(path, e))?;
        let provider = Self::from_json_str(&json)?;
        tracing::debug!(
            "Loaded metadata for {} packages from {}",
            provider.len(),
            path.display()
        );
        Ok(provider)
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(_) => value_list(value).join(", "),
        other => other.to_string(),
    }
}

fn value_list(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().map(value_text).collect(),
        serde_json::Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

impl MetadataProvider for MemoryProvider {
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>> {
        let found = self.packages.get(&normalize_name(name));
        Ok(match (found, version) {
            (Some(metadata), Some(wanted)) if metadata.version().is_some_and(|v| v != wanted) => {
                tracing::debug!(
                    "{} {} requested, snapshot has {}",
                    name,
                    wanted,
                    metadata.version().unwrap_or_default()
                );
                Some(metadata.clone())
            }
            (found, _) => found.cloned(),
        })
    }

    fn installed(&self) -> Result<Vec<String>> {
        Ok(self
            .packages
            .values()
            .filter_map(|m| m.name().map(String::from))
            .collect())
    }

    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        let Some(metadata) = self.packages.get(&normalize_name(name)) else {
            return Ok(Vec::new());
        };
        let location = metadata.location().map(Path::new);
        Ok(metadata
            .files()
            .iter()
            .map(|path| InstalledFile {
                path: path.clone(),
                absolute: location.map(|root| root.join(path)),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
