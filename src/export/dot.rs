//! Graphviz DOT rendering of exported edges.

use super::ExportedEdge;
use crate::model::RelationshipKind;
use std::collections::HashSet;

const ROOT_COLOUR: &str = "darkred";
const DIRECT_COLOUR: &str = "royalblue";
const TRANSITIVE_COLOUR: &str = "darkgreen";

/// Renders a `strict digraph` with the root, direct and transitive
/// dependencies in distinct colours.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotRenderer;

impl DotRenderer {
    #[must_use]
    pub fn render(&self, edges: &[ExportedEdge]) -> String {
        let root = edges
            .iter()
            .find(|e| e.kind == RelationshipKind::Describes)
            .map(|e| e.target.as_str());
        let direct: HashSet<&str> = edges
            .iter()
            .filter(|e| e.kind != RelationshipKind::Describes && Some(e.source.as_str()) == root)
            .map(|e| e.target.as_str())
            .collect();
        let colour = |name: &str| {
            if Some(name) == root {
                ROOT_COLOUR
            } else if direct.contains(name) {
                DIRECT_COLOUR
            } else {
                TRANSITIVE_COLOUR
            }
        };

        let mut out = String::from("strict digraph sbom {\n\tsize=\"8,10.5\"; ratio=fill;\n");
        let mut declared: HashSet<&str> = HashSet::new();
        let declare = |out: &mut String, name: &str| {
            out.push_str(&format!(
                "\t{} [shape=box, style=filled, fontcolor=white, fillcolor={}];\n",
                quote(name),
                colour(name)
            ));
        };

        if let Some(root) = root {
            declared.insert(root);
            declare(&mut out, root);
        }
        for edge in edges.iter().filter(|e| e.kind != RelationshipKind::Describes) {
            for name in [edge.source.as_str(), edge.target.as_str()] {
                if declared.insert(name) {
                    declare(&mut out, name);
                }
            }
            if edge.source != edge.target {
                out.push_str(&format!("\t{} -> {};\n", quote(&edge.source), quote(&edge.target)));
            }
        }
        out.push_str("}\n");
        out
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, kind: RelationshipKind) -> ExportedEdge {
        ExportedEdge::new(source, target, kind)
    }

    #[test]
    fn test_render_colours_and_edges() {
        let edges = vec![
            edge("app", "app", RelationshipKind::Describes),
            edge("app", "requests", RelationshipKind::DependsOn),
            edge("requests", "idna", RelationshipKind::DependsOn),
            edge("idna", "idna", RelationshipKind::DependsOn),
        ];
        let dot = DotRenderer.render(&edges);
        assert!(dot.starts_with("strict digraph sbom {\n\tsize=\"8,10.5\"; ratio=fill;\n"));
        assert!(dot.contains("\"app\" [shape=box, style=filled, fontcolor=white, fillcolor=darkred];"));
        assert!(dot.contains("\"requests\" [shape=box, style=filled, fontcolor=white, fillcolor=royalblue];"));
        assert!(dot.contains("\"idna\" [shape=box, style=filled, fontcolor=white, fillcolor=darkgreen];"));
        assert!(dot.contains("\t\"app\" -> \"requests\";\n"));
        assert!(dot.contains("\t\"requests\" -> \"idna\";\n"));
        assert!(!dot.contains("\"idna\" -> \"idna\""));
        assert_eq!(dot.matches("fillcolor").count(), 3);
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(DotRenderer.render(&[]), "strict digraph sbom {\n\tsize=\"8,10.5\"; ratio=fill;\n}\n");
    }
}
