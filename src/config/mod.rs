//! Configuration module for sbom-builder.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_builder::config::AppConfig;
//! use sbom_builder::document::{Encoding, SbomType};
//!
//! let config = AppConfig::builder()
//!     .sbom_type(SbomType::CycloneDx)
//!     .encoding(Encoding::Json)
//!     .include_cpe(true)
//!     .build();
//!
//! // Load from file
//! use sbom_builder::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-builder.yaml` file in your project root or `~/.config/sbom-builder/`:
//!
//! ```yaml
//! output:
//!   sbom_type: cyclonedx
//!   encoding: xml
//! content:
//!   include_cpe: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_PACKAGE_MANAGER, DEFAULT_PYTHON, DEFAULT_TIMEOUT_SECS,
    KNOWN_PACKAGE_MANAGERS,
};
pub use types::{
    AppConfig, AppConfigBuilder, ContentConfig, LicenseConfig, OutputConfig, ToolConfig,
    TraversalConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    user_config_dir, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-builder.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = generate_json_schema();
        for section in ["output", "content", "license", "traversal", "tool"] {
            assert!(schema.contains(&format!("\"{section}\"")), "missing {section}");
        }
    }
}
