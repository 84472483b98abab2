//! The dependency graph shared by the builder, the generator and the exporter.

use super::{FileEntry, PackageId, PackageNode, PackageRole};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Kind of a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    /// Document to root package, exactly once per graph
    Describes,
    /// Package to a file it owns
    Contains,
    /// Parent package to a directly required child
    DependsOn,
}

impl RelationshipKind {
    /// Token used by both SPDX encodings
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Describes => "DESCRIBES",
            Self::Contains => "CONTAINS",
            Self::DependsOn => "DEPENDS_ON",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint of a relationship.
///
/// Package and file endpoints are indexes into the graph's node and file
/// lists, which never shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeRef {
    Document,
    Package(usize),
    File(usize),
}

/// A directed relationship edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from: NodeRef,
    pub to: NodeRef,
    pub kind: RelationshipKind,
}

/// Metadata that disagreed with the first-seen node on a later encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConflict {
    /// The package whose metadata disagreed
    pub package: PackageId,
    /// Which attribute differed (`license` or `supplier`)
    pub field: String,
    /// Value kept on the node
    pub kept: String,
    /// Value seen later and discarded
    pub ignored: String,
}

/// Deduplicated graph of packages, files and relationships.
///
/// Nodes are keyed by identity and keep insertion order, which is the
/// discovery order used for stable document identifiers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    nodes: IndexMap<PackageId, PackageNode>,
    files: Vec<FileEntry>,
    relationships: Vec<Relationship>,
    #[serde(skip)]
    edge_set: HashSet<Relationship>,
    root: Option<usize>,
    conflicts: Vec<MetadataConflict>,
}

impl DependencyGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same identity exists.
    ///
    /// Returns the node index and whether it was newly inserted. An existing
    /// node is left untouched.
    pub fn insert_node(&mut self, node: PackageNode) -> (usize, bool) {
        if let Some(index) = self.nodes.get_index_of(&node.id) {
            return (index, false);
        }
        let (index, _) = self.nodes.insert_full(node.id.clone(), node);
        (index, true)
    }

    /// Mark a node as the root and record the DESCRIBES edge.
    ///
    /// Returns `false` if the index is unknown or a different root is already set.
    pub fn set_root(&mut self, index: usize) -> bool {
        match self.root {
            Some(existing) => existing == index,
            None => {
                let Some((_, node)) = self.nodes.get_index_mut(index) else {
                    return false;
                };
                node.role = PackageRole::Application;
                self.root = Some(index);
                self.push_edge(Relationship {
                    from: NodeRef::Document,
                    to: NodeRef::Package(index),
                    kind: RelationshipKind::Describes,
                });
                true
            }
        }
    }

    /// Record a DEPENDS_ON edge from `parent` to `child`.
    ///
    /// Self-edges and duplicate edges are ignored; returns whether an edge
    /// was added.
    pub fn add_dependency(&mut self, parent: usize, child: usize) -> bool {
        if parent == child || parent >= self.nodes.len() || child >= self.nodes.len() {
            return false;
        }
        self.push_edge(Relationship {
            from: NodeRef::Package(parent),
            to: NodeRef::Package(child),
            kind: RelationshipKind::DependsOn,
        })
    }

    /// Attach a file to its owning package with a CONTAINS edge.
    pub fn add_file(&mut self, owner: usize, file: FileEntry) -> Option<usize> {
        if owner >= self.nodes.len() {
            return None;
        }
        let index = self.files.len();
        self.files.push(file);
        self.push_edge(Relationship {
            from: NodeRef::Package(owner),
            to: NodeRef::File(index),
            kind: RelationshipKind::Contains,
        });
        Some(index)
    }

    fn push_edge(&mut self, edge: Relationship) -> bool {
        if self.edge_set.insert(edge) {
            self.relationships.push(edge);
            true
        } else {
            false
        }
    }

    /// Record a metadata conflict found while revisiting a node
    pub fn record_conflict(&mut self, conflict: MetadataConflict) {
        tracing::warn!(
            "Conflicting {} for {}: keeping '{}', ignoring '{}'",
            conflict.field,
            conflict.package,
            conflict.kept,
            conflict.ignored
        );
        self.conflicts.push(conflict);
    }

    /// Index of the node with the given identity
    #[must_use]
    pub fn index_of(&self, id: &PackageId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Node at the given index
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&PackageNode> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    /// Node with the given identity
    #[must_use]
    pub fn get(&self, id: &PackageId) -> Option<&PackageNode> {
        self.nodes.get(id)
    }

    /// First node with the given (normalized) name, regardless of version
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&PackageNode> {
        let name = super::normalize_name(name);
        self.nodes.values().find(|node| node.name() == name)
    }

    /// Nodes in discovery order
    pub fn nodes(&self) -> impl Iterator<Item = &PackageNode> {
        self.nodes.values()
    }

    /// Number of package nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Files in discovery order
    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Relationships in insertion order
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Number of DEPENDS_ON edges
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::DependsOn)
            .count()
    }

    /// Index of the root node
    #[must_use]
    pub const fn root_index(&self) -> Option<usize> {
        self.root
    }

    /// The root node
    #[must_use]
    pub fn root(&self) -> Option<&PackageNode> {
        self.root.and_then(|index| self.node(index))
    }

    /// Recorded metadata conflicts
    #[must_use]
    pub fn conflicts(&self) -> &[MetadataConflict] {
        &self.conflicts
    }

    /// Direct dependencies of a node, in edge order
    #[must_use]
    pub fn dependencies_of(&self, index: usize) -> Vec<usize> {
        self.relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::DependsOn && r.from == NodeRef::Package(index))
            .filter_map(|r| match r.to {
                NodeRef::Package(child) => Some(child),
                _ => None,
            })
            .collect()
    }

    /// Direct dependents (parents) of a node, in edge order
    #[must_use]
    pub fn dependents_of(&self, index: usize) -> Vec<usize> {
        self.relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::DependsOn && r.to == NodeRef::Package(index))
            .filter_map(|r| match r.from {
                NodeRef::Package(parent) => Some(parent),
                _ => None,
            })
            .collect()
    }

    /// Files owned by a node
    #[must_use]
    pub fn files_of(&self, index: usize) -> Vec<usize> {
        self.relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::Contains && r.from == NodeRef::Package(index))
            .filter_map(|r| match r.to {
                NodeRef::File(file) => Some(file),
                _ => None,
            })
            .collect()
    }

    /// Check the structural invariants of a finished graph.
    ///
    /// Returns a list of violations; an empty list means the graph has
    /// exactly one root and every node is reachable from it.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let Some(root) = self.root else {
            if !self.nodes.is_empty() {
                problems.push("graph has nodes but no root".to_string());
            }
            return problems;
        };

        let roots = self
            .nodes
            .values()
            .filter(|node| node.role == PackageRole::Application)
            .count();
        if roots != 1 {
            problems.push(format!("expected exactly one root, found {roots}"));
        }

        let describes = self
            .relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::Describes)
            .count();
        if describes != 1 {
            problems.push(format!("expected one DESCRIBES edge, found {describes}"));
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([root]);
        seen[root] = true;
        while let Some(index) = queue.pop_front() {
            for child in self.dependencies_of(index) {
                if !seen[child] {
                    seen[child] = true;
                    queue.push_back(child);
                }
            }
        }
        for (index, reached) in seen.iter().enumerate() {
            if !reached {
                if let Some(node) = self.node(index) {
                    problems.push(format!("{} is not reachable from the root", node.id));
                }
            }
        }
        problems
    }

    /// Content fingerprint over nodes and edges, for determinism checks.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut input = Vec::new();
        for node in self.nodes.values() {
            if let Ok(json) = serde_json::to_vec(node) {
                input.extend(json);
            }
        }
        for file in &self.files {
            input.extend(file.name.as_bytes());
        }
        for edge in &self.relationships {
            input.extend(format!("{:?}>{:?}:{}", edge.from, edge.to, edge.kind).as_bytes());
        }
        crate::utils::content_hash(&input)
    }
}
