//! Output schema and encoding selection.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SBOM schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SbomType {
    /// SPDX 2.3
    #[default]
    Spdx,
    /// CycloneDX 1.4
    #[value(name = "cyclonedx", alias = "cdx")]
    #[serde(alias = "cdx")]
    CycloneDx,
}

impl fmt::Display for SbomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SbomType::Spdx => write!(f, "spdx"),
            SbomType::CycloneDx => write!(f, "cyclonedx"),
        }
    }
}

/// Physical encoding of the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// SPDX tag/value text
    #[default]
    Tag,
    /// JSON
    Json,
    /// XML (CycloneDX only)
    Xml,
    /// YAML (SPDX only)
    Yaml,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Tag => write!(f, "tag"),
            Encoding::Json => write!(f, "json"),
            Encoding::Xml => write!(f, "xml"),
            Encoding::Yaml => write!(f, "yaml"),
        }
    }
}

/// A schema and encoding pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputFormat {
    pub sbom: SbomType,
    pub encoding: Encoding,
}

impl OutputFormat {
    #[must_use]
    pub const fn new(sbom: SbomType, encoding: Encoding) -> Self {
        Self { sbom, encoding }
    }

    /// Whether the schema supports the encoding
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(
            (self.sbom, self.encoding),
            (SbomType::Spdx, Encoding::Tag | Encoding::Json | Encoding::Yaml)
                | (SbomType::CycloneDx, Encoding::Json | Encoding::Xml)
        )
    }

    /// Substitute a valid encoding for an unsupported combination.
    ///
    /// SPDX+XML becomes SPDX tag; CycloneDX+tag or CycloneDX+YAML becomes
    /// CycloneDX JSON.
    #[must_use]
    pub fn corrected(self) -> Self {
        if self.is_valid() {
            return self;
        }
        let encoding = match self.sbom {
            SbomType::Spdx => Encoding::Tag,
            SbomType::CycloneDx => Encoding::Json,
        };
        tracing::info!(
            "{} does not support {} output, using {}",
            self.sbom,
            self.encoding,
            encoding
        );
        Self::new(self.sbom, encoding)
    }

    /// Conventional file extension for the format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match (self.sbom, self.encoding) {
            (SbomType::Spdx, Encoding::Json) => "spdx.json",
            (SbomType::Spdx, Encoding::Yaml) => "spdx.yaml",
            (SbomType::Spdx, _) => "spdx",
            (SbomType::CycloneDx, Encoding::Xml) => "cdx.xml",
            (SbomType::CycloneDx, _) => "cdx.json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sbom, self.encoding)
    }
}
