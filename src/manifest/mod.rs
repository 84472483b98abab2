//! Dependency manifest parsing.
//!
//! Each parser turns one file format into a flat list of declaration
//! strings; [`DependencySpec::parse`] then reduces those to names and pins.
//! Content that does not have the expected structure yields an empty list
//! and a warning, never an error.

mod pyproject;
mod requirements;
mod setup_cfg;
mod setup_py;

use crate::error::{ManifestErrorKind, Result, SbomError};
use crate::provider::DependencySpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Supported manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    /// `requirements.txt` and other `*.txt` requirement lists
    Requirements,
    /// `pyproject.toml`
    Pyproject,
    /// `setup.cfg`
    SetupCfg,
    /// `setup.py`
    SetupPy,
}

impl ManifestKind {
    /// Select the parser from the file name or extension.
    pub fn detect(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match file_name.as_str() {
            "pyproject.toml" => Ok(Self::Pyproject),
            "setup.cfg" => Ok(Self::SetupCfg),
            "setup.py" => Ok(Self::SetupPy),
            name if name.ends_with(".txt") || name.ends_with(".in") => Ok(Self::Requirements),
            _ => Err(SbomError::manifest(
                format!("detecting format of {}", path.display()),
                ManifestErrorKind::UnsupportedKind(file_name),
            )),
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requirements => write!(f, "requirements"),
            Self::Pyproject => write!(f, "pyproject.toml"),
            Self::SetupCfg => write!(f, "setup.cfg"),
            Self::SetupPy => write!(f, "setup.py"),
        }
    }
}

/// Output of a format parser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    /// Project name, when the format declares one
    pub project_name: Option<String>,
    /// Raw declaration strings, in file order
    pub declarations: Vec<String>,
}

/// Parse manifest text of a known kind.
#[must_use]
pub fn parse(kind: ManifestKind, content: &str) -> ParsedManifest {
    let parsed = match kind {
        ManifestKind::Requirements => requirements::parse(content),
        ManifestKind::Pyproject => pyproject::parse(content).unwrap_or_default(),
        ManifestKind::SetupCfg => setup_cfg::parse(content),
        ManifestKind::SetupPy => setup_py::parse(content),
    };
    if parsed.declarations.is_empty() && !content.trim().is_empty() {
        tracing::warn!("No dependency declarations found in {} content", kind);
    }
    parsed
}

/// A loaded manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Where the manifest was read from
    pub path: PathBuf,
    /// Detected format
    pub kind: ManifestKind,
    /// Project name declared in the manifest
    pub project_name: Option<String>,
    /// Raw declaration strings
    pub declarations: Vec<String>,
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// Fails only when the format is unknown or the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let kind = ManifestKind::detect(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SbomError::io(path, e))?;
        let parsed = parse(kind, &content);
        tracing::debug!(
            "{}: {} declarations ({})",
            path.display(),
            parsed.declarations.len(),
            kind
        );
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            project_name: parsed.project_name,
            declarations: parsed.declarations,
        })
    }

    /// Parsed dependency declarations, skipping unparseable entries
    #[must_use]
    pub fn dependencies(&self) -> Vec<DependencySpec> {
        self.declarations
            .iter()
            .filter_map(|d| DependencySpec::parse(d))
            .collect()
    }

    /// Name for the synthetic root: the declared project name, else the
    /// name of the directory holding the manifest.
    #[must_use]
    pub fn root_name(&self) -> String {
        if let Some(name) = &self.project_name {
            return name.clone();
        }
        std::fs::canonicalize(&self.path)
            .ok()
            .as_deref()
            .unwrap_or(self.path.as_path())
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .map_or_else(|| "project".to_string(), String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(
            ManifestKind::detect(Path::new("a/requirements-dev.txt")).expect("txt"),
            ManifestKind::Requirements
        );
        assert_eq!(
            ManifestKind::detect(Path::new("pyproject.toml")).expect("toml"),
            ManifestKind::Pyproject
        );
        assert_eq!(
            ManifestKind::detect(Path::new("x/SETUP.CFG")).expect("cfg"),
            ManifestKind::SetupCfg
        );
        assert!(ManifestKind::detect(Path::new("Pipfile")).is_err());
    }

    #[test]
    fn test_malformed_pyproject_is_empty() {
        let parsed = parse(ManifestKind::Pyproject, "this is [not toml");
        assert!(parsed.declarations.is_empty());
    }
}
