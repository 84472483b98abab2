//! Output handling for generated documents.

use crate::error::{Result, SbomError};
use std::io::Write;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => OutputTarget::File(p),
            None => OutputTarget::Stdout,
        }
    }
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| SbomError::io("<stdout>", e))
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content).map_err(|e| SbomError::io(path, e))?;
            tracing::info!("Written to {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_target_from_option_none() {
        assert_eq!(OutputTarget::from_option(None), OutputTarget::Stdout);
    }

    #[test]
    fn test_output_target_from_option_some() {
        let path = PathBuf::from("/tmp/test.json");
        assert_eq!(OutputTarget::from_option(Some(path.clone())), OutputTarget::File(path));
    }

    #[test]
    fn test_write_output_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("sbom.spdx");
        write_output("SPDXVersion: SPDX-2.3\n", &OutputTarget::File(path.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "SPDXVersion: SPDX-2.3\n");
    }

    #[test]
    fn test_write_output_missing_directory() {
        let target = OutputTarget::File(PathBuf::from("/nonexistent/dir/sbom.spdx"));
        assert!(matches!(write_output("x", &target), Err(SbomError::Io { .. })));
    }
}
