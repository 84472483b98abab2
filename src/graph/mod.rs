//! Dependency graph assembly.
//!
//! [`GraphBuilder`] walks the dependency universe depth-first from a
//! [`RootSpec`], asking a [`MetadataProvider`](crate::provider::MetadataProvider)
//! for each component. Every unique (name, version) becomes exactly one node;
//! a component with N distinct parents gets N inbound edges.
//!
//! # Example
//!
//! ```ignore
//! let table = LicenseTable::builtin();
//! let resolver = LicenseResolver::new(table);
//! let provider = CachingProvider::new(PipProvider::default());
//!
//! let graph = GraphBuilder::new(&provider, &resolver)
//!     .with_options(BuildOptions::default())
//!     .build(&RootSpec::Component("requests".into()))?;
//! ```

mod builder;
mod prefetch;

pub use builder::GraphBuilder;
pub use prefetch::prefetch;

use crate::manifest::Manifest;

/// Name of the synthetic root used for whole-environment builds
pub const DEFAULT_ENVIRONMENT_NAME: &str = "python-environment";

/// Where a traversal starts.
#[derive(Debug, Clone)]
pub enum RootSpec {
    /// A single installed component
    Component(String),
    /// Every installed package, under a synthetic root
    Environment,
    /// The declarations of a manifest, under a synthetic root
    Manifest(Manifest),
}

impl RootSpec {
    /// Short description for logging
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Component(name) => format!("component {name}"),
            Self::Environment => "installed environment".to_string(),
            Self::Manifest(manifest) => format!("manifest {}", manifest.path.display()),
        }
    }
}

/// Traversal options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Keep supplier email addresses
    pub include_email: bool,
    /// Record installed files with CONTAINS edges
    pub include_files: bool,
    /// PURL type for package URLs (e.g. `pypi`)
    pub package_manager: String,
    /// Name of the synthetic root for [`RootSpec::Environment`]
    pub environment_name: String,
    /// Worker threads for metadata prefetch; 0 or 1 means sequential
    pub jobs: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_email: true,
            include_files: false,
            package_manager: "pypi".to_string(),
            environment_name: DEFAULT_ENVIRONMENT_NAME.to_string(),
            jobs: 0,
        }
    }
}
