//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".sbom-builder.yaml",
    ".sbom-builder.yml",
    "sbom-builder.yaml",
    "sbom-builder.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-builder/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(path) = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_in_dir(&cwd))
    {
        return Some(path);
    }

    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    if let Some(path) = user_config_dir().and_then(|dir| find_config_in_dir(&dir)) {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// `~/.config/sbom-builder` or the platform equivalent
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sbom-builder"))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override, so an untouched
    /// CLI flag never clobbers a file setting.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        // Output config
        if other.output.sbom_type != defaults.output.sbom_type {
            self.output.sbom_type = other.output.sbom_type;
        }
        if other.output.encoding != defaults.output.encoding {
            self.output.encoding = other.output.encoding;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.graph_file.is_some() {
            self.output.graph_file.clone_from(&other.output.graph_file);
        }

        // Content config
        if other.content.include_license != defaults.content.include_license {
            self.content.include_license = other.content.include_license;
        }
        if other.content.include_purl != defaults.content.include_purl {
            self.content.include_purl = other.content.include_purl;
        }
        if other.content.include_cpe != defaults.content.include_cpe {
            self.content.include_cpe = other.content.include_cpe;
        }
        if other.content.include_files != defaults.content.include_files {
            self.content.include_files = other.content.include_files;
        }
        if other.content.include_email != defaults.content.include_email {
            self.content.include_email = other.content.include_email;
        }
        if other.content.package_manager != defaults.content.package_manager {
            self.content.package_manager.clone_from(&other.content.package_manager);
        }

        // License config
        if other.license.table_path.is_some() {
            self.license.table_path.clone_from(&other.license.table_path);
        }
        if other.license.fuzzy {
            self.license.fuzzy = true;
        }
        if other.license.fuzzy_threshold != defaults.license.fuzzy_threshold {
            self.license.fuzzy_threshold = other.license.fuzzy_threshold;
        }

        // Traversal config
        if other.traversal.jobs != defaults.traversal.jobs {
            self.traversal.jobs = other.traversal.jobs;
        }
        if other.traversal.environment_name != defaults.traversal.environment_name {
            self.traversal.environment_name.clone_from(&other.traversal.environment_name);
        }
        if other.traversal.python != defaults.traversal.python {
            self.traversal.python.clone_from(&other.traversal.python);
        }
        if other.traversal.timeout_secs != defaults.traversal.timeout_secs {
            self.traversal.timeout_secs = other.traversal.timeout_secs;
        }

        // Tool config
        if other.tool != defaults.tool {
            self.tool = other.tool.clone();
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# sbom-builder configuration
# Place this file at .sbom-builder.yaml in your project root or ~/.config/sbom-builder/

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Encoding, SbomType};
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".sbom-builder.yaml");
        std::fs::write(&config_path, "output:\n  sbom_type: cyclonedx\n").unwrap();

        let found = find_config_in_dir(tmp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let yaml = r"
output:
  sbom_type: cyclonedx
  encoding: xml
content:
  include_cpe: true
license:
  fuzzy: true
  fuzzy_threshold: 90
";
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.output.sbom_type, SbomType::CycloneDx);
        assert_eq!(config.output.encoding, Encoding::Xml);
        assert!(config.content.include_cpe);
        assert!(config.content.include_purl);
        assert!(config.license.fuzzy);
        assert_eq!(config.license.fuzzy_threshold, 90.0);
    }

    #[test]
    fn test_load_empty_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("empty.yaml");
        std::fs::write(&config_path, "").unwrap();
        assert_eq!(load_config_file(&config_path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_load_config_file_invalid() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("bad.yaml");
        std::fs::write(&config_path, "output:\n  sbom_type: [not, a, type]\n").unwrap();
        assert!(matches!(load_config_file(&config_path), Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_config_merge() {
        let mut base = AppConfig::builder()
            .sbom_type(SbomType::CycloneDx)
            .include_cpe(true)
            .build();
        let overrides = AppConfig::builder().encoding(Encoding::Xml).jobs(8).build();

        base.merge(&overrides);

        assert_eq!(base.output.sbom_type, SbomType::CycloneDx);
        assert_eq!(base.output.encoding, Encoding::Xml);
        assert!(base.content.include_cpe);
        assert_eq!(base.traversal.jobs, 8);
    }

    #[test]
    fn test_generate_example_config() {
        let example = generate_example_config();
        assert!(example.contains("output:"));
        assert!(example.contains("include_license"));
        let parsed: AppConfig = serde_yaml::from_str(&example).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "content:\n  include_cpe: true\n").unwrap();

        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path));
    }
}
