//! Default values for sbom-builder configuration.

/// Default package-URL type
pub const DEFAULT_PACKAGE_MANAGER: &str = "pypi";

/// Default similarity threshold for fuzzy license matching, in percent
pub const DEFAULT_FUZZY_THRESHOLD: f64 = crate::license::DEFAULT_FUZZY_THRESHOLD;

/// Default interpreter used to run pip
pub const DEFAULT_PYTHON: &str = "python3";

/// Default pip command timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Package-URL types accepted for Python packages
pub const KNOWN_PACKAGE_MANAGERS: &[&str] = &["pypi", "conda", "generic"];
