//! **Dependency-graph SBOM generation for Python environments.**
//!
//! `sbom-builder` walks the installed dependency graph of a Python package, a
//! requirements manifest, or a whole environment and emits a Software Bill of
//! Materials in **SPDX** (tag-value, JSON, YAML) or **CycloneDX** (JSON, XML).
//!
//! ## Core Concepts & Modules
//!
//! - **[`provider`]**: The [`MetadataProvider`](provider::MetadataProvider) seam. Package
//!   metadata comes from `pip show` in production and from a frozen snapshot in tests.
//! - **[`license`]**: Resolves free-text license declarations to canonical SPDX identifiers,
//!   with a synonym table and optional fuzzy matching.
//! - **[`supplier`]**: Normalises author strings into `Name (email)` attributions.
//! - **[`graph`]**: The [`GraphBuilder`](graph::GraphBuilder), which assembles a deduplicated
//!   [`DependencyGraph`](model::DependencyGraph) by depth-first traversal.
//! - **[`document`]**: Turns a graph into a sealed document and serializes it.
//! - **[`export`]**: Flattens relationships into labelled edges and Graphviz DOT.
//! - **[`pipeline`]**: End-to-end orchestration used by the CLI.
//!
//! ## Getting Started
//!
//! ```no_run
//! use sbom_builder::document::{Encoding, RandomIds, SbomType};
//! use sbom_builder::pipeline::{run_generate, GenerateRequest, InputSource};
//! use sbom_builder::AppConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::builder()
//!         .sbom_type(SbomType::CycloneDx)
//!         .encoding(Encoding::Json)
//!         .build();
//!     let request = GenerateRequest {
//!         input: Some(InputSource::Module("requests".into())),
//!         metadata: None,
//!     };
//!
//!     let outcome = run_generate(&config, &request, &RandomIds)?;
//!     eprintln!("{} packages", outcome.document.packages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Building step by step
//!
//! ```no_run
//! use sbom_builder::document::{serializer_for, DocumentGenerator, FixedIds, GeneratorOptions, OutputFormat};
//! use sbom_builder::graph::{GraphBuilder, RootSpec};
//! use sbom_builder::license::{LicenseResolver, LicenseTable};
//! use sbom_builder::provider::PipProvider;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = LicenseTable::builtin();
//!     let resolver = LicenseResolver::new(table);
//!     let provider = PipProvider::new("python3");
//!
//!     let graph = GraphBuilder::new(&provider, &resolver).build(&RootSpec::Component("flask".into()))?;
//!     let document = DocumentGenerator::from_graph(
//!         &graph,
//!         resolver.table().version(),
//!         &FixedIds::default(),
//!         GeneratorOptions::default(),
//!     )?;
//!     println!("{}", serializer_for(OutputFormat::default()).serialize(&document)?);
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Similarity scores are percentages computed from string lengths
    clippy::cast_precision_loss,
    // Doc completeness: # Errors sections would repeat the error enum
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Option structs legitimately use many bools for include flags
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    // Serializers are unit structs implementing a shared trait
    clippy::unused_self,
    clippy::similar_names
)]

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod graph;
pub mod license;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod supplier;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use document::{
    DocumentGenerator, DocumentSerializer, Encoding, OutputFormat, SbomDocument, SbomType,
};
pub use error::{ErrorContext, OptionContext, Result, SbomError};
pub use export::{DotRenderer, ExportedEdge, RelationshipExporter};
pub use graph::{BuildOptions, GraphBuilder, RootSpec};
pub use license::{LicenseResolution, LicenseResolver, LicenseTable};
pub use model::{DependencyGraph, PackageId, PackageNode, RelationshipKind, Supplier, SupplierKind};
pub use provider::{CachingProvider, MemoryProvider, MetadataProvider, PipProvider};
