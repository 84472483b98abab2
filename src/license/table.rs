//! Canonical license table.
//!
//! The built-in table is the full SPDX license list compiled into the `spdx`
//! crate. External lists are read from the SPDX license-list JSON format.

use crate::error::{LicenseErrorKind, Result, SbomError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// One license from the canonical list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseEntry {
    /// SPDX short identifier, e.g. `Apache-2.0`
    pub license_id: String,
    /// Full display name
    pub name: String,
    /// Whether the identifier is deprecated
    #[serde(default, rename = "isDeprecatedLicenseId")]
    pub is_deprecated: bool,
    /// Reference URL
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseListFile {
    #[serde(default)]
    license_list_version: Option<String>,
    licenses: Vec<LicenseEntry>,
}

/// Read-only mapping from license identifier to display name, deprecation
/// flag and reference URL.
///
/// Lookups are case-insensitive. When two entries share a display name, the
/// non-deprecated one wins the name index.
#[derive(Debug, Clone)]
pub struct LicenseTable {
    version: String,
    entries: Vec<LicenseEntry>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl LicenseTable {
    /// Build a table from entries, in the given order.
    #[must_use]
    pub fn new(version: impl Into<String>, entries: Vec<LicenseEntry>) -> Self {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_name: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            by_id.entry(entry.license_id.to_lowercase()).or_insert(index);
            let name = entry.name.to_lowercase();
            let replace = match by_name.get(&name) {
                Some(&existing) => entries[existing].is_deprecated && !entry.is_deprecated,
                None => true,
            };
            if replace {
                by_name.insert(name, index);
            }
        }
        Self {
            version: version.into(),
            entries,
            by_id,
            by_name,
        }
    }

    /// Parse the SPDX license-list JSON format.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LicenseListFile = serde_json::from_str(json).map_err(|e| {
            SbomError::license("parsing license list", LicenseErrorKind::InvalidJson(e.to_string()))
        })?;
        if file.licenses.is_empty() {
            return Err(SbomError::license("parsing license list", LicenseErrorKind::Empty));
        }
        let version = file
            .license_list_version
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self::new(version, file.licenses))
    }

    /// Load an external license list from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SbomError::io(path, e))?;
        let table = Self::from_json_str(&json)?;
        tracing::debug!(
            "Loaded {} licenses (list version {}) from {}",
            table.len(),
            table.version(),
            path.display()
        );
        Ok(table)
    }

    /// The SPDX license list bundled with the `spdx` crate, built once per process.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<LicenseTable>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let entries = spdx::identifiers::LICENSES
                    .iter()
                    .map(|&(id, name, flags)| LicenseEntry {
                        license_id: id.to_string(),
                        name: name.to_string(),
                        is_deprecated: flags & spdx::identifiers::IS_DEPRECATED != 0,
                        reference: Some(format!("https://spdx.org/licenses/{id}.html")),
                    })
                    .collect();
                Arc::new(Self::new(list_version(spdx::identifiers::VERSION), entries))
            })
            .clone()
    }

    /// License list version, e.g. `3.27`
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of licenses
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no licenses
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order
    #[must_use]
    pub fn entries(&self) -> &[LicenseEntry] {
        &self.entries
    }

    /// Look up an entry by identifier, ignoring case
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LicenseEntry> {
        self.by_id
            .get(&id.trim().to_lowercase())
            .map(|&index| &self.entries[index])
    }

    /// Look up an entry by display name, ignoring case
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&LicenseEntry> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&index| &self.entries[index])
    }

    /// Whether the identifier is deprecated in this table
    #[must_use]
    pub fn is_deprecated(&self, id: &str) -> bool {
        self.get(id).is_some_and(|entry| entry.is_deprecated)
    }
}

/// `major.minor` of a license-list release tag such as `3.27.0`
fn list_version(release: &str) -> String {
    release.split('.').take(2).collect::<Vec<_>>().join(".")
}
