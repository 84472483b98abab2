//! Package identity and external locators.
//!
//! A package is identified by its normalized name plus an optional version.
//! Normalization lower-cases the name and rewrites underscores to hyphens,
//! so `Typing_Extensions` and `typing-extensions` are the same package.
//!
//! Two external identifiers are derived from that identity:
//!
//! 1. **PURL** (Package URL) - `pkg:<ecosystem>/<name>@<version>`
//! 2. **CPE** (Common Platform Enumeration 2.3) - vendor from the supplier

use packageurl::PackageUrl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize a package name for identity comparison.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

/// Identity of a package node: normalized name and optional version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    name: String,
    version: Option<String>,
}

impl PackageId {
    /// Create a new identity, normalizing the name.
    ///
    /// Blank versions are treated as absent.
    #[must_use]
    pub fn new(name: &str, version: Option<&str>) -> Self {
        Self {
            name: normalize_name(name),
            version: version
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from),
        }
    }

    /// The normalized package name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package version, if known
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Build a package URL for a package in the given ecosystem.
///
/// Returns `None` when the ecosystem or name is rejected by the PURL grammar.
#[must_use]
pub fn package_url(ecosystem: &str, name: &str, version: Option<&str>) -> Option<String> {
    let mut purl = match PackageUrl::new(ecosystem, name) {
        Ok(purl) => purl,
        Err(e) => {
            tracing::debug!("Cannot build purl for {}/{}: {}", ecosystem, name, e);
            return None;
        }
    };
    if let Some(version) = version {
        purl.with_version(version);
    }
    Some(purl.to_string())
}

/// Build a CPE 2.3 formatted string for an application.
///
/// The vendor comes from the supplier name; a missing vendor or version
/// becomes the `*` wildcard.
#[must_use]
pub fn cpe(vendor: &str, product: &str, version: Option<&str>) -> String {
    let vendor = cpe_component(vendor);
    let product = cpe_component(product);
    let version = version.map_or_else(|| "*".to_string(), cpe_component);
    format!("cpe:2.3:a:{vendor}:{product}:{version}:*:*:*:*:*:*:*")
}

/// Encode one CPE attribute: lower-case, spaces as `_`, punctuation escaped.
fn cpe_component(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "*".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.to_lowercase().chars() {
        match c {
            c if c.is_ascii_alphanumeric() => out.push(c),
            '_' | '-' | '.' => out.push(c),
            c if c.is_whitespace() => out.push('_'),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}
