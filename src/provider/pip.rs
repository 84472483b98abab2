//! Metadata from the local Python environment through `pip`.

use super::{InstalledFile, MetadataProvider, PackageMetadata};
use crate::error::{ProviderErrorKind, Result, SbomError};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Runs `<python> -m pip ...` for every query.
#[derive(Debug, Clone)]
pub struct PipProvider {
    python: String,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct PipListEntry {
    name: String,
}

impl PipProvider {
    /// Provider using the given interpreter (e.g. `python3`)
    #[must_use]
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            timeout: None,
        }
    }

    /// Kill pip calls that run longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run pip and return its stdout.
    ///
    /// A non-zero exit status is not an error here: `pip show` exits with 1
    /// and prints nothing for unknown packages.
    fn run(&self, args: &[&str]) -> Result<(bool, String)> {
        let describe = || format!("{} -m pip {}", self.python, args.join(" "));
        let mut child = Command::new(&self.python)
            .arg("-m")
            .arg("pip")
            .args(args)
            .env("PIP_DISABLE_PIP_VERSION_CHECK", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SbomError::provider(describe(), ProviderErrorKind::CommandFailed(e.to_string()))
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            SbomError::provider(
                describe(),
                ProviderErrorKind::CommandFailed("stdout not captured".to_string()),
            )
        })?;
        let reader = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });

        let status = match self.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let started = Instant::now();
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if started.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SbomError::provider(
                            describe(),
                            ProviderErrorKind::Timeout(timeout.as_secs()),
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
            }
        };

        let bytes = reader
            .join()
            .map_err(|_| {
                SbomError::provider(
                    describe(),
                    ProviderErrorKind::CommandFailed("output reader panicked".to_string()),
                )
            })??;
        Ok((status.success(), String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl Default for PipProvider {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl MetadataProvider for PipProvider {
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>> {
        let (_, stdout) = self.run(&["show", name])?;
        let metadata = PackageMetadata::parse_show_output(&stdout);
        if let (Some(found), Some(wanted)) = (metadata.as_ref().and_then(|m| m.version()), version)
        {
            if found != wanted {
                tracing::debug!(
                    "{} {} requested but {} is installed",
                    name,
                    wanted,
                    found
                );
            }
        }
        Ok(metadata)
    }

    fn installed(&self) -> Result<Vec<String>> {
        let (ok, stdout) = self.run(&["list", "--format=json"])?;
        if !ok {
            return Err(SbomError::provider(
                "pip list",
                ProviderErrorKind::CommandFailed("non-zero exit status".to_string()),
            ));
        }
        let entries: Vec<PipListEntry> = serde_json::from_str(&stdout).map_err(|e| {
            SbomError::provider(
                "pip list",
                ProviderErrorKind::InvalidMetadata(e.to_string()),
            )
        })?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }

    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        let (_, stdout) = self.run(&["show", "-f", name])?;
        let Some(metadata) = PackageMetadata::parse_show_output(&stdout) else {
            return Ok(Vec::new());
        };
        let location = metadata.location().map(Path::new);
        Ok(metadata
            .files()
            .iter()
            .map(|path| InstalledFile {
                path: path.clone(),
                absolute: location.map(|root| root.join(path)),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "pip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_interpreter_is_an_error() {
        let provider = PipProvider::new("definitely-not-a-python-binary-xyz");
        let err = provider.lookup("requests", None).expect_err("spawn fails");
        assert!(matches!(
            err,
            SbomError::Provider {
                source: ProviderErrorKind::CommandFailed(_),
                ..
            }
        ));
    }
}
