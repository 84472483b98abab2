//! Depth-first graph builder.

use super::{prefetch, BuildOptions, RootSpec};
use crate::error::Result;
use crate::license::{LicenseResolver, UNKNOWN_LICENSE};
use crate::model::{
    cpe, package_url, Checksum, ChecksumAlgorithm, DependencyGraph, FileEntry, MetadataConflict,
    PackageId, PackageLicense, PackageNode, PackageRole, Supplier,
};
use crate::provider::{CachingProvider, DependencySpec, MetadataProvider, PackageMetadata};
use crate::utils::sha256_file;

/// One pending visit on the traversal stack.
#[derive(Debug, Clone)]
struct Visit {
    parent: Option<usize>,
    name: String,
    version: Option<String>,
    evidence: Option<String>,
}

impl Visit {
    fn child(parent: usize, name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            parent: Some(parent),
            name: name.into(),
            version,
            evidence: None,
        }
    }
}

/// Builds a [`DependencyGraph`] from a root and a metadata provider.
pub struct GraphBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    resolver: &'a LicenseResolver,
    options: BuildOptions,
}

impl<'a> GraphBuilder<'a> {
    /// Builder with default options
    pub fn new(provider: &'a dyn MetadataProvider, resolver: &'a LicenseResolver) -> Self {
        Self {
            provider,
            resolver,
            options: BuildOptions::default(),
        }
    }

    /// Replace the traversal options
    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Traverse from `root` and return the finished graph.
    ///
    /// Components without metadata are dropped. The only errors are
    /// provider failures while resolving the root itself.
    pub fn build(&self, root: &RootSpec) -> Result<DependencyGraph> {
        tracing::info!("Building dependency graph from {}", root.describe());
        let graph = if self.options.jobs > 1 {
            let cache = CachingProvider::new(self.provider);
            let seeds = self.seeds(&cache, root)?;
            prefetch(&cache, seeds, self.options.jobs)?;
            self.assemble(&cache, root)?
        } else {
            self.assemble(self.provider, root)?
        };
        tracing::info!(
            "Graph has {} packages, {} dependency edges, {} files",
            graph.node_count(),
            graph.dependency_count(),
            graph.files().len()
        );
        Ok(graph)
    }

    /// Lookups the traversal will start with, for prefetching.
    fn seeds(
        &self,
        provider: &dyn MetadataProvider,
        root: &RootSpec,
    ) -> Result<Vec<(String, Option<String>)>> {
        Ok(match root {
            RootSpec::Component(name) => vec![(name.clone(), None)],
            RootSpec::Environment => provider
                .installed()?
                .into_iter()
                .map(|name| (name, None))
                .collect(),
            RootSpec::Manifest(manifest) => manifest
                .dependencies()
                .into_iter()
                .map(|spec| (spec.name, spec.version))
                .collect(),
        })
    }

    fn assemble(&self, provider: &dyn MetadataProvider, root: &RootSpec) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        let mut stack: Vec<Visit> = Vec::new();

        match root {
            RootSpec::Component(name) => {
                // Errors resolving the root are fatal; everything below it recovers.
                let Some(metadata) = provider.lookup(name, None)? else {
                    tracing::warn!("Component {} not found", name);
                    return Ok(graph);
                };
                let index =
                    self.expand(provider, &mut graph, &mut stack, None, name, &metadata, None);
                graph.set_root(index);
            }
            RootSpec::Environment => {
                let index = self.synthetic_root(&mut graph, &self.options.environment_name, None);
                let installed = provider.installed()?;
                stack.extend(
                    installed
                        .into_iter()
                        .rev()
                        .map(|name| Visit::child(index, name, None)),
                );
            }
            RootSpec::Manifest(manifest) => {
                let evidence = manifest.path.display().to_string();
                let index =
                    self.synthetic_root(&mut graph, &manifest.root_name(), Some(evidence.as_str()));
                stack.extend(manifest.dependencies().into_iter().rev().map(
                    |DependencySpec { name, version, .. }| Visit {
                        evidence: Some(evidence.clone()),
                        ..Visit::child(index, name, version)
                    },
                ));
            }
        }

        while let Some(visit) = stack.pop() {
            let metadata = match provider.lookup(&visit.name, visit.version.as_deref()) {
                Ok(Some(metadata)) => metadata,
                Ok(None) => {
                    tracing::debug!("Dropping {}: no metadata", visit.name);
                    continue;
                }
                Err(e) => {
                    tracing::debug!("Dropping {}: {}", visit.name, e);
                    continue;
                }
            };
            self.expand(
                provider,
                &mut graph,
                &mut stack,
                visit.parent,
                &visit.name,
                &metadata,
                visit.evidence.as_deref(),
            );
        }

        Ok(graph)
    }

    /// Materialize a node (or find the existing one), link it to its
    /// parent and queue its dependencies. Returns the node index.
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        provider: &dyn MetadataProvider,
        graph: &mut DependencyGraph,
        stack: &mut Vec<Visit>,
        parent: Option<usize>,
        requested: &str,
        metadata: &PackageMetadata,
        evidence: Option<&str>,
    ) -> usize {
        let name = metadata.name().unwrap_or(requested);
        let id = PackageId::new(name, metadata.version());

        if let Some(index) = graph.index_of(&id) {
            if let Some(parent) = parent {
                graph.add_dependency(parent, index);
            }
            self.check_conflicts(graph, index, metadata);
            return index;
        }

        let node = self.make_node(id, metadata, evidence);
        tracing::debug!("Adding {}", node.id);
        let (index, _) = graph.insert_node(node);
        if let Some(parent) = parent {
            graph.add_dependency(parent, index);
        }

        if self.options.include_files {
            self.add_files(provider, graph, index, name);
        }

        stack.extend(
            metadata
                .requires()
                .iter()
                .rev()
                .filter_map(|raw| DependencySpec::parse(raw))
                .map(|spec| Visit::child(index, spec.name, spec.version)),
        );
        index
    }

    fn make_node(&self, id: PackageId, metadata: &PackageMetadata, evidence: Option<&str>) -> PackageNode {
        let declared = metadata.license().to_string();
        let resolution = self.resolver.resolve(&declared);
        let comment = if declared.is_empty() {
            None
        } else {
            resolution.comment(&declared)
        };
        let supplier = Supplier::from_metadata(
            metadata.author(),
            metadata.author_email(),
            self.options.include_email,
        );

        let mut node = PackageNode::new(id, PackageRole::Library);
        node.purl = package_url(&self.options.package_manager, node.name(), node.version());
        node.cpe = Some(cpe(&supplier.name, node.name(), node.version()));
        node.license = PackageLicense {
            declared,
            resolved: resolution.identifier,
            is_valid_spdx: resolution.is_valid_spdx,
            is_deprecated: resolution.is_deprecated,
            comment,
        };
        node.supplier = supplier;
        node.homepage = metadata.home_page().map(String::from);
        node.summary = metadata.summary().map(String::from);
        node.download_location = metadata.download_url().map(String::from);
        node.checksum = metadata.checksum().and_then(Checksum::parse);
        node.evidence = evidence.map(String::from);
        node
    }

    fn synthetic_root(&self, graph: &mut DependencyGraph, name: &str, evidence: Option<&str>) -> usize {
        let mut node = PackageNode::new(PackageId::new(name, None), PackageRole::Application);
        node.license.resolved = UNKNOWN_LICENSE.to_string();
        node.purl = package_url(&self.options.package_manager, node.name(), None);
        node.evidence = evidence.map(String::from);
        let (index, _) = graph.insert_node(node);
        graph.set_root(index);
        index
    }

    /// First-seen metadata wins; record what a later encounter disagreed on.
    fn check_conflicts(&self, graph: &mut DependencyGraph, index: usize, metadata: &PackageMetadata) {
        let Some(node) = graph.node(index) else {
            return;
        };
        let mut conflicts = Vec::new();
        let license = metadata.license();
        if !license.is_empty() && !node.license.declared.is_empty() && license != node.license.declared {
            conflicts.push(MetadataConflict {
                package: node.id.clone(),
                field: "license".to_string(),
                kept: node.license.declared.clone(),
                ignored: license.to_string(),
            });
        }
        let supplier = Supplier::from_metadata(
            metadata.author(),
            metadata.author_email(),
            self.options.include_email,
        );
        if !supplier.is_unknown() && !node.supplier.is_unknown() && supplier != node.supplier {
            conflicts.push(MetadataConflict {
                package: node.id.clone(),
                field: "supplier".to_string(),
                kept: node.supplier.formatted(),
                ignored: supplier.formatted(),
            });
        }
        for conflict in conflicts {
            graph.record_conflict(conflict);
        }
    }

    fn add_files(&self, provider: &dyn MetadataProvider, graph: &mut DependencyGraph, owner: usize, name: &str) {
        let files = match provider.files(name) {
            Ok(files) => files,
            Err(e) => {
                tracing::debug!("No file list for {}: {}", name, e);
                return;
            }
        };
        for file in files {
            let checksum = file.absolute.as_deref().and_then(|path| match sha256_file(path) {
                Ok(value) => Some(Checksum {
                    algorithm: ChecksumAlgorithm::Sha256,
                    value,
                }),
                Err(e) => {
                    tracing::debug!("Cannot hash {}: {}", path.display(), e);
                    None
                }
            });
            graph.add_file(
                owner,
                FileEntry {
                    name: file.path,
                    checksum,
                },
            );
        }
    }
}
