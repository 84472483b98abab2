//! Configuration validation for sbom-builder.

use super::defaults::KNOWN_PACKAGE_MANAGERS;
use super::types::{AppConfig, ContentConfig, LicenseConfig, OutputConfig, ToolConfig, TraversalConfig};
use std::path::Path;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.output.validate());
        errors.extend(self.content.validate());
        errors.extend(self.license.validate());
        errors.extend(self.traversal.validate());
        errors.extend(self.tool.validate());
        errors
    }
}

fn check_parent_exists(field: &str, path: &Path, errors: &mut Vec<ConfigError>) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            errors.push(ConfigError::new(
                field,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref file) = self.file {
            check_parent_exists("output.file", file, &mut errors);
        }
        if let Some(ref graph_file) = self.graph_file {
            check_parent_exists("output.graph_file", graph_file, &mut errors);
        }
        errors
    }
}

impl Validatable for ContentConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !KNOWN_PACKAGE_MANAGERS.contains(&self.package_manager.as_str()) {
            errors.push(ConfigError::new(
                "content.package_manager",
                format!(
                    "Unknown package manager '{}'. Valid options: {}",
                    self.package_manager,
                    KNOWN_PACKAGE_MANAGERS.join(", ")
                ),
            ));
        }
        errors
    }
}

impl Validatable for LicenseConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !(0.0..=100.0).contains(&self.fuzzy_threshold) {
            errors.push(ConfigError::new(
                "license.fuzzy_threshold",
                format!("Threshold must be between 0 and 100, got {}", self.fuzzy_threshold),
            ));
        }
        if let Some(ref path) = self.table_path {
            if !path.exists() {
                errors.push(ConfigError::new(
                    "license.table_path",
                    format!("License list not found: {}", path.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for TraversalConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.environment_name.trim().is_empty() {
            errors.push(ConfigError::new("traversal.environment_name", "Must not be empty"));
        }
        if self.python.trim().is_empty() {
            errors.push(ConfigError::new("traversal.python", "Must not be empty"));
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new("traversal.timeout_secs", "Timeout must be at least 1 second"));
        }
        errors
    }
}

impl Validatable for ToolConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ConfigError::new("tool.name", "Must not be empty"));
        }
        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
