//! Encoding-independent document tree.
//!
//! Every serializer consumes the same [`SbomDocument`], so the logical
//! content of an SPDX tag file and a CycloneDX XML file cannot drift apart.

use crate::model::{Checksum, PackageRole, RelationshipKind, Supplier};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// SPDX specification version written by the SPDX serializers
pub const SPDX_VERSION: &str = "SPDX-2.3";
/// CycloneDX specification version written by the CycloneDX serializers
pub const CYCLONEDX_SPEC_VERSION: &str = "1.4";
/// License of the SBOM data itself
pub const DATA_LICENSE: &str = "CC0-1.0";
/// Base of every SPDX document namespace
pub const SPDX_NAMESPACE_BASE: &str = "http://spdx.org/spdxdocs/";
/// Placeholder for absent SPDX values
pub const NOASSERTION: &str = "NOASSERTION";
/// Creator comment attached to every document
pub const CREATOR_COMMENT: &str = "This document has been automatically generated.";

const DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";
const PACKAGE_PREFIX: &str = "SPDXRef-Package-";
const FILE_PREFIX: &str = "SPDXRef-File-";

/// Reference to an element of a document.
///
/// Package and file references carry the stable `<n>-<name>` reference
/// built from the 1-based discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ElementRef {
    Document,
    Package(String),
    File(String),
}

impl ElementRef {
    /// Build a package reference from its discovery order and name
    #[must_use]
    pub fn package(ordinal: usize, name: &str) -> Self {
        Self::Package(stable_ref(ordinal, name))
    }

    /// Build a file reference from its discovery order and name
    #[must_use]
    pub fn file(ordinal: usize, name: &str) -> Self {
        Self::File(stable_ref(ordinal, name))
    }

    /// Canonical SPDX identifier
    #[must_use]
    pub fn spdx_id(&self) -> String {
        match self {
            Self::Document => DOCUMENT_ID.to_string(),
            Self::Package(reference) => format!("{PACKAGE_PREFIX}{reference}"),
            Self::File(reference) => format!("{FILE_PREFIX}{reference}"),
        }
    }

    /// Bare `<n>-<name>` reference used as the CycloneDX `bom-ref`.
    ///
    /// The document itself has no bom-ref.
    #[must_use]
    pub fn bom_ref(&self) -> Option<&str> {
        match self {
            Self::Document => None,
            Self::Package(reference) | Self::File(reference) => Some(reference),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spdx_id())
    }
}

/// `<n>-<name>` with characters outside `[A-Za-z0-9.-]` replaced by `-`
fn stable_ref(ordinal: usize, name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{ordinal}-{sanitized}")
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHeader {
    /// Document name, spaces replaced by `-`
    pub name: String,
    /// Random per-document instance id
    pub instance: Uuid,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Creating tool name
    pub tool_name: String,
    /// Creating tool version
    pub tool_version: String,
    /// Version of the license list used for resolution
    pub license_list_version: String,
}

impl DocumentHeader {
    /// SPDX document namespace URI
    #[must_use]
    pub fn namespace(&self) -> String {
        format!("{SPDX_NAMESPACE_BASE}{}-{}", self.name, self.instance)
    }

    /// CycloneDX serial number URN
    #[must_use]
    pub fn serial_number(&self) -> String {
        format!("urn:uuid:{}", self.instance)
    }

    /// Creation timestamp as `YYYY-MM-DDThh:mm:ssZ`
    #[must_use]
    pub fn created_timestamp(&self) -> String {
        self.created.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// `Tool: <name>-<version>` creator line
    #[must_use]
    pub fn creator(&self) -> String {
        format!("Tool: {}-{}", self.tool_name, self.tool_version)
    }
}

/// A package as it appears in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageEntry {
    pub element: ElementRef,
    pub name: String,
    pub version: Option<String>,
    pub role: PackageRole,
    pub supplier: Supplier,
    /// License string as reported by the package
    pub declared_license: String,
    /// Resolved identifier, or `None` when unresolved or suppressed
    pub license: Option<String>,
    /// Whether license information is reported at all
    pub license_included: bool,
    pub license_comment: Option<String>,
    pub homepage: Option<String>,
    pub summary: Option<String>,
    pub download_location: Option<String>,
    pub purl: Option<String>,
    pub cpe: Option<String>,
    pub checksum: Option<Checksum>,
    /// Where the package was declared, e.g. a manifest path
    pub evidence: Option<String>,
}

impl PackageEntry {
    /// SPDX license value, `NOASSERTION` when unresolved or suppressed
    #[must_use]
    pub fn spdx_license(&self) -> &str {
        self.license.as_deref().unwrap_or(NOASSERTION)
    }

    /// SPDX supplier value
    #[must_use]
    pub fn spdx_supplier(&self) -> String {
        if self.supplier.is_unknown() {
            NOASSERTION.to_string()
        } else {
            format!("{}: {}", self.supplier.kind, self.supplier.formatted())
        }
    }
}

/// A file as it appears in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntryDoc {
    pub element: ElementRef,
    pub name: String,
    pub checksum: Option<Checksum>,
}

/// A relationship between two document elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentRelationship {
    pub from: ElementRef,
    pub to: ElementRef,
    pub kind: RelationshipKind,
}

impl DocumentRelationship {
    /// Key for the canonical emission order
    #[must_use]
    pub fn sort_key(&self) -> (String, String, &'static str) {
        (self.from.spdx_id(), self.to.spdx_id(), self.kind.as_str())
    }
}

/// A sealed, encoding-independent SBOM document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SbomDocument {
    pub header: DocumentHeader,
    pub packages: Vec<PackageEntry>,
    pub files: Vec<FileEntryDoc>,
    /// Sorted by (from id, to id, kind)
    pub relationships: Vec<DocumentRelationship>,
}

impl SbomDocument {
    /// The package the document describes
    #[must_use]
    pub fn root(&self) -> Option<&PackageEntry> {
        let described = self
            .relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::Describes)?;
        self.package(&described.to)
    }

    /// Look up a package by reference
    #[must_use]
    pub fn package(&self, element: &ElementRef) -> Option<&PackageEntry> {
        self.packages.iter().find(|p| &p.element == element)
    }

    /// Dependency edges grouped per source element, in relationship order.
    ///
    /// Each source appears once, listing every DEPENDS_ON target.
    #[must_use]
    pub fn dependency_groups(&self) -> Vec<(&ElementRef, Vec<&ElementRef>)> {
        let mut groups: indexmap::IndexMap<&ElementRef, Vec<&ElementRef>> =
            indexmap::IndexMap::new();
        for relationship in &self.relationships {
            if relationship.kind == RelationshipKind::DependsOn {
                groups
                    .entry(&relationship.from)
                    .or_default()
                    .push(&relationship.to);
            }
        }
        groups.into_iter().collect()
    }

    /// Files owned by a package through CONTAINS edges
    #[must_use]
    pub fn files_of(&self, owner: &ElementRef) -> Vec<&FileEntryDoc> {
        self.relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::Contains && &r.from == owner)
            .filter_map(|r| self.files.iter().find(|f| f.element == r.to))
            .collect()
    }
}
