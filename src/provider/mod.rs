//! Package metadata providers.
//!
//! The graph builder never inspects an environment itself; it asks a
//! [`MetadataProvider`] for each package it visits. Providers must keep
//! "not found" (`Ok(None)`) distinct from "found with no fields".
//!
//! - [`PipProvider`] queries the local Python environment through `pip`
//! - [`MemoryProvider`] serves a frozen snapshot, typically from JSON
//! - [`CachingProvider`] memoises any other provider

mod cache;
mod memory;
mod metadata;
mod pip;
pub mod requirement;

pub use cache::{CacheStats, CachingProvider};
pub use memory::MemoryProvider;
pub use metadata::{InstalledFile, PackageMetadata};
pub use pip::PipProvider;
pub use requirement::DependencySpec;

use crate::error::Result;
use std::sync::Arc;

/// Source of per-package metadata.
pub trait MetadataProvider: Send + Sync {
    /// Metadata for a package, or `None` if it is not known.
    ///
    /// `version` is a hint from a pinned declaration; providers that can
    /// only see one installed version may ignore it.
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>>;

    /// Names of every installed package.
    fn installed(&self) -> Result<Vec<String>>;

    /// Files installed by a package.
    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        let _ = name;
        Ok(Vec::new())
    }

    /// Short provider name for logging.
    fn name(&self) -> &'static str;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Box<P> {
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>> {
        (**self).lookup(name, version)
    }

    fn installed(&self) -> Result<Vec<String>> {
        (**self).installed()
    }

    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        (**self).files(name)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Arc<P> {
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>> {
        (**self).lookup(name, version)
    }

    fn installed(&self) -> Result<Vec<String>> {
        (**self).installed()
    }

    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        (**self).files(name)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn lookup(&self, name: &str, version: Option<&str>) -> Result<Option<PackageMetadata>> {
        (**self).lookup(name, version)
    }

    fn installed(&self) -> Result<Vec<String>> {
        (**self).installed()
    }

    fn files(&self, name: &str) -> Result<Vec<InstalledFile>> {
        (**self).files(name)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
