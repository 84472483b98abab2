//! Relationship edge export for graph visualization.
//!
//! Edges are projected to bare component names with any schema identifier
//! prefix removed. The DESCRIBES edge always comes first so a renderer can
//! find the root before laying out the rest.

mod dot;

pub use dot::DotRenderer;

use crate::document::{ElementRef, SbomDocument};
use crate::model::{DependencyGraph, NodeRef, RelationshipKind};
use serde::Serialize;

/// A `(source, target, kind)` triple with bare labels
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExportedEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
}

impl ExportedEdge {
    fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}

/// Projects relationships into [`ExportedEdge`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipExporter;

impl RelationshipExporter {
    /// Export the edges of a finished graph.
    ///
    /// The document end of the DESCRIBES edge is labelled with the root's name.
    #[must_use]
    pub fn export(graph: &DependencyGraph) -> Vec<ExportedEdge> {
        let document_name = graph.root().map_or("", |root| root.name());
        let label = |node: NodeRef| -> String {
            match node {
                NodeRef::Document => document_name.to_string(),
                NodeRef::Package(index) => graph.node(index).map(|n| n.name().to_string()).unwrap_or_default(),
                NodeRef::File(index) => graph.files().get(index).map(|f| f.name.clone()).unwrap_or_default(),
            }
        };
        let edges = graph
            .relationships()
            .iter()
            .map(|r| ExportedEdge::new(label(r.from), label(r.to), r.kind))
            .collect();
        order(edges)
    }

    /// Export the relationships of a sealed document.
    #[must_use]
    pub fn export_document(document: &SbomDocument) -> Vec<ExportedEdge> {
        let label = |element: &ElementRef| -> String {
            match element {
                ElementRef::Document => document.header.name.clone(),
                other => strip_identifier(&other.spdx_id()).to_string(),
            }
        };
        let edges = document
            .relationships
            .iter()
            .map(|r| ExportedEdge::new(label(&r.from), label(&r.to), r.kind))
            .collect();
        order(edges)
    }
}

/// DESCRIBES first, the rest sorted by (source, target, kind)
fn order(edges: Vec<ExportedEdge>) -> Vec<ExportedEdge> {
    let (mut ordered, mut rest): (Vec<_>, Vec<_>) = edges
        .into_iter()
        .partition(|edge| edge.kind == RelationshipKind::Describes);
    rest.sort();
    ordered.append(&mut rest);
    ordered
}

/// Strip `SPDXRef-Package-<n>-`, `SPDXRef-File-<n>-` or `<n>-` from an identifier.
///
/// Anything else is returned unchanged.
#[must_use]
pub fn strip_identifier(identifier: &str) -> &str {
    let rest = identifier
        .strip_prefix("SPDXRef-Package-")
        .or_else(|| identifier.strip_prefix("SPDXRef-File-"))
        .unwrap_or(identifier);
    match rest.split_once('-') {
        Some((ordinal, name))
            if !ordinal.is_empty() && !name.is_empty() && ordinal.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => rest,
    }
}
