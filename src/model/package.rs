//! Package node data structures.

use super::PackageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a node is the graph's root or a transitive dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageRole {
    /// The component the document describes
    Application,
    /// Any dependency reached from the root
    Library,
}

impl PackageRole {
    /// CycloneDX component type for this role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Library => "library",
        }
    }
}

/// Supplier classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplierKind {
    Person,
    Organization,
    #[default]
    Unknown,
}

impl fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person => write!(f, "Person"),
            Self::Organization => write!(f, "Organization"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Normalized supplier attribution for a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    /// Person, organization, or unknown
    pub kind: SupplierKind,
    /// Formatted name, without the email
    pub name: String,
    /// Contact email, if one was found and emails are included
    pub email: Option<String>,
}

impl Supplier {
    /// Supplier with no attribution at all
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether there is anything to report
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.kind == SupplierKind::Unknown || self.name.is_empty()
    }

    /// `Name (email)` rendering used by both document schemas
    #[must_use]
    pub fn formatted(&self) -> String {
        match &self.email {
            Some(email) if self.name.is_empty() => format!("({email})"),
            Some(email) => format!("{} ({email})", self.name),
            None => self.name.clone(),
        }
    }
}

/// Checksum algorithms that can be reported for packages and files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    Sha256,
    Sha1,
    Md5,
}

impl ChecksumAlgorithm {
    /// Parse an algorithm label such as `sha256`, `SHA-256` or `SHA256`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().replace('-', "").as_str() {
            "SHA256" => Some(Self::Sha256),
            "SHA1" => Some(Self::Sha1),
            "MD5" => Some(Self::Md5),
            _ => None,
        }
    }

    /// SPDX algorithm token
    #[must_use]
    pub const fn spdx_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha1 => "SHA1",
            Self::Md5 => "MD5",
        }
    }

    /// CycloneDX algorithm token
    #[must_use]
    pub const fn cyclonedx_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha1 => "SHA-1",
            Self::Md5 => "MD5",
        }
    }
}

/// A content checksum
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    /// Lower-case hex digest
    pub value: String,
}

impl Checksum {
    /// Parse `algorithm:hex` or `algorithm=hex`, as found in wheel RECORD files
    /// and provider metadata.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (alg, value) = raw.split_once(':').or_else(|| raw.split_once('='))?;
        let algorithm = ChecksumAlgorithm::parse(alg)?;
        let value = value.trim().to_lowercase();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self { algorithm, value })
    }
}

/// License information attached to a node after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLicense {
    /// License string as declared by the package metadata
    pub declared: String,
    /// Canonical identifier, or `UNKNOWN`
    pub resolved: String,
    /// Whether `resolved` is a valid SPDX identifier or expression
    pub is_valid_spdx: bool,
    /// Whether `resolved` is deprecated in the license table
    pub is_deprecated: bool,
    /// Explanation when the declared string is not a clean canonical id
    pub comment: Option<String>,
}

/// One unique (name, version) component in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageNode {
    /// Identity (normalized name and version)
    pub id: PackageId,
    /// Root or transitive dependency
    pub role: PackageRole,
    /// Declared and resolved license
    pub license: PackageLicense,
    /// Normalized supplier
    pub supplier: Supplier,
    /// Project home page
    pub homepage: Option<String>,
    /// One-line summary
    pub summary: Option<String>,
    /// Where the package can be downloaded from
    pub download_location: Option<String>,
    /// Package URL
    pub purl: Option<String>,
    /// CPE 2.3 identifier
    pub cpe: Option<String>,
    /// Content checksum of the distribution
    pub checksum: Option<Checksum>,
    /// Where the package was declared (e.g. a manifest file)
    pub evidence: Option<String>,
}

impl PackageNode {
    /// Create a node with only an identity.
    #[must_use]
    pub fn new(id: PackageId, role: PackageRole) -> Self {
        Self {
            id,
            role,
            license: PackageLicense::default(),
            supplier: Supplier::unknown(),
            homepage: None,
            summary: None,
            download_location: None,
            purl: None,
            cpe: None,
            checksum: None,
            evidence: None,
        }
    }

    /// The normalized name
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// The version, if known
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.id.version()
    }

    /// Whether this is the graph root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.role == PackageRole::Application
    }
}

/// A file owned by a package (target of a CONTAINS edge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the install location
    pub name: String,
    /// Digest of the file contents, if the file could be read
    pub checksum: Option<Checksum>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_formatted() {
        let supplier = Supplier {
            kind: SupplierKind::Person,
            name: "Jane Doe".to_string(),
            email: Some("jane@example.org".to_string()),
        };
        assert_eq!(supplier.formatted(), "Jane Doe (jane@example.org)");
        assert!(!supplier.is_unknown());
        assert!(Supplier::unknown().is_unknown());
    }

    #[test]
    fn test_checksum_parse() {
        let checksum = Checksum::parse("sha256:ABCDEF01").expect("valid checksum");
        assert_eq!(checksum.algorithm, ChecksumAlgorithm::Sha256);
        assert_eq!(checksum.value, "abcdef01");

        assert!(Checksum::parse("sha256=zz").is_none());
        assert!(Checksum::parse("crc32:abcd").is_none());
        assert!(Checksum::parse("no-separator").is_none());
    }

    #[test]
    fn test_role_tokens() {
        assert_eq!(PackageRole::Application.as_str(), "application");
        assert_eq!(PackageRole::Library.as_str(), "library");
    }
}
