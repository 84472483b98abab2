//! Pipeline orchestration for SBOM generation.
//!
//! Shared logic for the resolve → build → generate → serialize → write
//! workflow, so the CLI handlers stay thin.

mod output;

pub use output::{write_output, OutputTarget};

use crate::config::{AppConfig, LicenseConfig, Validatable};
use crate::document::{
    serializer_for, DocumentGenerator, DocumentIdSource, OutputFormat, SbomDocument,
};
use crate::error::{ErrorContext, Result, SbomError};
use crate::export::{DotRenderer, RelationshipExporter};
use crate::graph::{GraphBuilder, RootSpec};
use crate::license::{LicenseResolver, LicenseTable};
use crate::manifest::Manifest;
use crate::model::DependencyGraph;
use crate::provider::{MemoryProvider, MetadataProvider, PipProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What to build an SBOM for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A single installed module and its dependency closure
    Module(String),
    /// A requirements file or other dependency manifest
    Requirement(PathBuf),
    /// Every package installed in the environment
    System,
}

/// Inputs of one `generate` run that are not configuration
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub input: Option<InputSource>,
    /// Frozen metadata snapshot used instead of querying pip
    pub metadata: Option<PathBuf>,
}

/// Everything a run produced
#[derive(Debug)]
pub struct GenerateOutcome {
    pub graph: DependencyGraph,
    pub document: SbomDocument,
    /// Format actually written, after correction
    pub format: OutputFormat,
    pub rendered: String,
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Nothing to process
    pub const USAGE: i32 = 2;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Exit code for a failed run
#[must_use]
pub fn exit_code_for(error: &SbomError) -> i32 {
    match error {
        SbomError::Validation(_) => exit_codes::USAGE,
        _ => exit_codes::ERROR,
    }
}

/// License resolver for the configured table and matching mode.
pub fn load_resolver(config: &LicenseConfig) -> Result<LicenseResolver> {
    let table = match &config.table_path {
        Some(path) => Arc::new(
            LicenseTable::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        ),
        None => LicenseTable::builtin(),
    };
    let resolver = LicenseResolver::new(table);
    Ok(if config.fuzzy {
        resolver.with_fuzzy(config.fuzzy_threshold)
    } else {
        resolver
    })
}

/// Metadata source: a snapshot file when given, otherwise pip.
pub fn load_provider(
    config: &AppConfig,
    metadata: Option<&std::path::Path>,
) -> Result<Box<dyn MetadataProvider>> {
    match metadata {
        Some(path) => {
            let provider = MemoryProvider::from_path(path)?;
            tracing::info!("Loaded metadata for {} packages from {}", provider.len(), path.display());
            Ok(Box::new(provider))
        }
        None => Ok(Box::new(
            PipProvider::new(config.traversal.python.clone())
                .with_timeout(Duration::from_secs(config.traversal.timeout_secs)),
        )),
    }
}

/// Traversal root for an input source.
pub fn root_spec(input: &InputSource) -> Result<RootSpec> {
    Ok(match input {
        InputSource::Module(name) => RootSpec::Component(name.clone()),
        InputSource::Requirement(path) => RootSpec::Manifest(Manifest::load(path)?),
        InputSource::System => RootSpec::Environment,
    })
}

/// Build the dependency graph, failing when the root could not be resolved.
pub fn build_graph(
    config: &AppConfig,
    provider: &dyn MetadataProvider,
    resolver: &LicenseResolver,
    root: &RootSpec,
) -> Result<DependencyGraph> {
    let graph = GraphBuilder::new(provider, resolver)
        .with_options(config.build_options())
        .build(root)?;
    if graph.root().is_none() {
        return Err(SbomError::validation(format!(
            "nothing to process: {} was not found",
            root.describe()
        )));
    }
    Ok(graph)
}

/// Turn a finished graph into a sealed document.
pub fn generate_document(
    config: &AppConfig,
    graph: &DependencyGraph,
    license_list_version: &str,
    ids: &dyn DocumentIdSource,
) -> Result<SbomDocument> {
    DocumentGenerator::from_graph(graph, license_list_version, ids, config.generator_options())
}

/// Serialize a document in the configured (corrected) format.
pub fn render(config: &AppConfig, document: &SbomDocument) -> Result<(OutputFormat, String)> {
    let serializer = serializer_for(config.output_format());
    let format = serializer.format();
    let rendered = serializer
        .serialize(document)
        .with_context(|| format!("rendering {format}"))?;
    Ok((format, rendered))
}

/// DOT rendering of a document's relationships.
#[must_use]
pub fn render_graph(document: &SbomDocument) -> String {
    DotRenderer.render(&RelationshipExporter::export_document(document))
}

/// Run a complete `generate` and write the results to the configured targets.
pub fn run_generate(
    config: &AppConfig,
    request: &GenerateRequest,
    ids: &dyn DocumentIdSource,
) -> Result<GenerateOutcome> {
    let Some(input) = &request.input else {
        return Err(SbomError::validation(
            "nothing to process: give a module, a requirements file or --system",
        ));
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(SbomError::config(messages.join("; ")));
    }

    let resolver = load_resolver(&config.license)?;
    let provider = load_provider(config, request.metadata.as_deref())?;
    let root = root_spec(input)?;
    tracing::debug!("Using {} metadata provider", provider.name());

    let graph = build_graph(config, provider.as_ref(), &resolver, &root)
        .context("building dependency graph")?;
    let document = generate_document(config, &graph, resolver.table().version(), ids)?;
    let (format, rendered) = render(config, &document)?;

    write_output(&rendered, &OutputTarget::from_option(config.output.file.clone()))?;
    if let Some(path) = &config.output.graph_file {
        write_output(&render_graph(&document), &OutputTarget::File(path.clone()))?;
    }
    tracing::info!(
        "Generated {} document for {} with {} packages",
        format,
        document.header.name,
        document.packages.len()
    );

    Ok(GenerateOutcome {
        graph,
        document,
        format,
        rendered,
    })
}
