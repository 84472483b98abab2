//! Graph data model.
//!
//! A [`DependencyGraph`] owns one [`PackageNode`] per unique
//! (normalized name, version) pair and the relationship edges between the
//! document, packages and files. The builder populates it once; afterwards
//! the generator and the exporter only read it.

mod graph;
mod identifiers;
mod package;

pub use graph::*;
pub use identifiers::*;
pub use package::*;
