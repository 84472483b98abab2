//! Configuration types for sbom-builder.

use super::defaults::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_PACKAGE_MANAGER, DEFAULT_PYTHON, DEFAULT_TIMEOUT_SECS,
};
use crate::document::{Encoding, GeneratorOptions, OutputFormat, SbomType};
use crate::graph::{BuildOptions, DEFAULT_ENVIRONMENT_NAME};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file values with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Output schema, encoding and destinations
    pub output: OutputConfig,
    /// Which optional content to include in the document
    pub content: ContentConfig,
    /// License resolution settings
    pub license: LicenseConfig,
    /// Dependency traversal settings
    pub traversal: TraversalConfig,
    /// Creating tool identity written into documents
    pub tool: ToolConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Requested output format with unsupported combinations corrected
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::new(self.output.sbom_type, self.output.encoding).corrected()
    }

    /// Options for the graph builder
    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            include_email: self.content.include_email,
            include_files: self.content.include_files,
            package_manager: self.content.package_manager.clone(),
            environment_name: self.traversal.environment_name.clone(),
            jobs: self.traversal.jobs,
        }
    }

    /// Options for the document generator
    #[must_use]
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            include_license: self.content.include_license,
            include_purl: self.content.include_purl,
            include_cpe: self.content.include_cpe,
            tool_name: self.tool.name.clone(),
            tool_version: self.tool.version.clone(),
        }
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the SBOM schema.
    pub const fn sbom_type(mut self, sbom_type: SbomType) -> Self {
        self.config.output.sbom_type = sbom_type;
        self
    }

    /// Set the output encoding.
    pub const fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.output.encoding = encoding;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Set the DOT graph output file.
    pub fn graph_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.graph_file = file;
        self
    }

    /// Include resolved licenses.
    pub const fn include_license(mut self, include: bool) -> Self {
        self.config.content.include_license = include;
        self
    }

    /// Include package URLs.
    pub const fn include_purl(mut self, include: bool) -> Self {
        self.config.content.include_purl = include;
        self
    }

    /// Include CPE identifiers.
    pub const fn include_cpe(mut self, include: bool) -> Self {
        self.config.content.include_cpe = include;
        self
    }

    /// Include installed files.
    pub const fn include_files(mut self, include: bool) -> Self {
        self.config.content.include_files = include;
        self
    }

    /// Keep supplier email addresses.
    pub const fn include_email(mut self, include: bool) -> Self {
        self.config.content.include_email = include;
        self
    }

    /// Set the package-URL type.
    pub fn package_manager(mut self, package_manager: impl Into<String>) -> Self {
        self.config.content.package_manager = package_manager.into();
        self
    }

    /// Load the license list from a file instead of the built-in copy.
    pub fn license_table(mut self, path: Option<PathBuf>) -> Self {
        self.config.license.table_path = path;
        self
    }

    /// Enable similarity matching at `threshold` percent.
    pub const fn fuzzy_license(mut self, threshold: f64) -> Self {
        self.config.license.fuzzy = true;
        self.config.license.fuzzy_threshold = threshold;
        self
    }

    /// Set the number of prefetch workers.
    pub const fn jobs(mut self, jobs: usize) -> Self {
        self.config.traversal.jobs = jobs;
        self
    }

    /// Set the Python interpreter used to run pip.
    pub fn python(mut self, python: impl Into<String>) -> Self {
        self.config.traversal.python = python.into();
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Configuration Sections
// ============================================================================

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// SBOM schema: spdx or cyclonedx
    pub sbom_type: SbomType,
    /// Encoding: tag, json, xml or yaml
    pub encoding: Encoding,
    /// Output file path (omit for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Write a Graphviz DOT dependency graph to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_file: Option<PathBuf>,
}

/// Document content toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContentConfig {
    /// Report resolved licenses (otherwise NOASSERTION)
    pub include_license: bool,
    /// Report package URLs
    pub include_purl: bool,
    /// Report CPE identifiers
    pub include_cpe: bool,
    /// Report installed files with CONTAINS relationships
    pub include_files: bool,
    /// Keep supplier email addresses
    pub include_email: bool,
    /// Package-URL type
    pub package_manager: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            include_license: true,
            include_purl: true,
            include_cpe: false,
            include_files: false,
            include_email: true,
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
        }
    }
}

/// License resolution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LicenseConfig {
    /// SPDX license-list JSON to use instead of the built-in copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_path: Option<PathBuf>,
    /// Fall back to similarity matching for unrecognised licenses
    pub fuzzy: bool,
    /// Minimum similarity score in percent
    #[schemars(range(min = 0.0, max = 100.0))]
    pub fuzzy_threshold: f64,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            fuzzy: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Dependency traversal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TraversalConfig {
    /// Metadata prefetch workers; 0 or 1 is sequential
    pub jobs: usize,
    /// Root name for whole-environment documents
    pub environment_name: String,
    /// Python interpreter used to run pip
    pub python: String,
    /// Per-command timeout for pip, in seconds
    #[schemars(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            environment_name: DEFAULT_ENVIRONMENT_NAME.to_string(),
            python: DEFAULT_PYTHON.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Creating tool identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolConfig {
    /// Tool name
    pub name: String,
    /// Tool version
    pub version: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
