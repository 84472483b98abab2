//! Unified error types for sbom-builder.
//!
//! Most failure modes of an SBOM build are recovered locally (missing
//! packages are dropped, unknown licenses become `NOASSERTION`, malformed
//! manifests yield no dependencies). The variants here cover what is left:
//! I/O, external tool failures, bad configuration and misuse of the
//! document generator.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-builder operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomError {
    /// Errors talking to a metadata provider
    #[error("Metadata lookup failed: {context}")]
    Provider {
        context: String,
        #[source]
        source: ProviderErrorKind,
    },

    /// Errors reading a dependency manifest
    #[error("Manifest processing failed: {context}")]
    Manifest {
        context: String,
        #[source]
        source: ManifestErrorKind,
    },

    /// Errors loading the canonical license table
    #[error("License table error: {context}")]
    License {
        context: String,
        #[source]
        source: LicenseErrorKind,
    },

    /// Errors while generating or serializing a document
    #[error("Document generation failed: {context}")]
    Generate {
        context: String,
        #[source]
        source: GenerateErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific provider error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProviderErrorKind {
    #[error("Failed to run package tool: {0}")]
    CommandFailed(String),

    #[error("Package tool timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}

/// Specific manifest error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ManifestErrorKind {
    #[error("Unsupported manifest type: {0}")]
    UnsupportedKind(String),
}

/// Specific license table error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LicenseErrorKind {
    #[error("Invalid license list JSON: {0}")]
    InvalidJson(String),

    #[error("License list is empty")]
    Empty,
}

/// Specific generation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GenerateErrorKind {
    #[error("Document is already sealed")]
    Sealed,

    #[error("{0} cannot be added after relationships")]
    OutOfOrder(&'static str),

    #[error("Unknown element reference: {0}")]
    UnknownElement(String),

    #[error("JSON serialization failed: {0}")]
    Json(String),

    #[error("YAML serialization failed: {0}")]
    Yaml(String),

    #[error("XML serialization failed: {0}")]
    Xml(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-builder operations
pub type Result<T> = std::result::Result<T, SbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomError {
    /// Create a provider error with context
    pub fn provider(context: impl Into<String>, source: ProviderErrorKind) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }

    /// Create a manifest error with context
    pub fn manifest(context: impl Into<String>, source: ManifestErrorKind) -> Self {
        Self::Manifest {
            context: context.into(),
            source,
        }
    }

    /// Create a license table error with context
    pub fn license(context: impl Into<String>, source: LicenseErrorKind) -> Self {
        Self::License {
            context: context.into(),
            source,
        }
    }

    /// Create a generation error with context
    pub fn generate(context: impl Into<String>, source: GenerateErrorKind) -> Self {
        Self::Generate {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomError {
    fn from(err: serde_json::Error) -> Self {
        Self::generate("JSON serialization", GenerateErrorKind::Json(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are chained outermost first, so an error raised while
/// reading a manifest inside a build reads `"building graph: reading
/// requirements.txt: ..."`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomError, new_ctx: &str) -> SbomError {
    match err {
        SbomError::Provider {
            context: existing,
            source,
        } => SbomError::Provider {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Manifest {
            context: existing,
            source,
        } => SbomError::Manifest {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::License {
            context: existing,
            source,
        } => SbomError::License {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Generate {
            context: existing,
            source,
        } => SbomError::Generate {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Io {
            path,
            message,
            source,
        } => SbomError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomError::Config(msg) => SbomError::Config(chain_context(new_ctx, &msg)),
        SbomError::Validation(msg) => SbomError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as `"new: existing"`.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| SbomError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| SbomError::Validation(f().into()))
    }
}
