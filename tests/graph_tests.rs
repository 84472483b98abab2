//! Integration tests for dependency graph assembly.

use sbom_builder::graph::{BuildOptions, GraphBuilder, RootSpec};
use sbom_builder::license::{LicenseResolver, LicenseTable};
use sbom_builder::manifest::Manifest;
use sbom_builder::model::{NodeRef, PackageRole, RelationshipKind};
use sbom_builder::provider::{MemoryProvider, PackageMetadata};
use tempfile::TempDir;

fn resolver() -> LicenseResolver {
    LicenseResolver::new(LicenseTable::builtin())
}

fn package(name: &str, version: &str, license: &str, requires: &str) -> PackageMetadata {
    PackageMetadata::new()
        .with("Name", name)
        .with("Version", version)
        .with("License", license)
        .with("Requires", requires)
}

/// app -> (left, right), left -> shared, right -> shared
fn diamond() -> MemoryProvider {
    MemoryProvider::new()
        .with(package("app", "1.0", "MIT", "left, right"))
        .with(package("left", "1.0", "MIT", "shared"))
        .with(package("right", "2.0", "BSD License", "shared"))
        .with(package("shared", "3.0", "Apache 2.0", ""))
}

fn build(provider: &MemoryProvider, root: &RootSpec, options: BuildOptions) -> sbom_builder::DependencyGraph {
    let resolver = resolver();
    GraphBuilder::new(provider, &resolver)
        .with_options(options)
        .build(root)
        .expect("build should succeed")
}

fn inbound(graph: &sbom_builder::DependencyGraph, name: &str) -> usize {
    let node = graph.find_by_name(name).expect("node present");
    let index = graph.index_of(&node.id).expect("indexed");
    graph.dependents_of(index).len()
}

mod deduplication {
    use super::*;

    #[test]
    fn shared_child_is_one_node_with_one_edge_per_parent() {
        let graph = build(&diamond(), &RootSpec::Component("app".into()), BuildOptions::default());

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.nodes().filter(|n| n.name() == "shared").count(), 1);
        assert_eq!(inbound(&graph, "shared"), 2);
        assert_eq!(inbound(&graph, "left"), 1);
    }

    #[test]
    fn cycle_terminates_with_two_nodes() {
        let provider = MemoryProvider::new()
            .with(package("alpha", "1.0", "MIT", "beta"))
            .with(package("beta", "1.0", "MIT", "alpha"));
        let graph = build(&provider, &RootSpec::Component("alpha".into()), BuildOptions::default());

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.dependency_count(), 2);
        assert_eq!(graph.root().map(|n| n.name()), Some("alpha"));
    }

    #[test]
    fn self_dependency_adds_no_edge() {
        let provider = MemoryProvider::new().with(package("ouroboros", "1.0", "MIT", "ouroboros"));
        let graph = build(&provider, &RootSpec::Component("ouroboros".into()), BuildOptions::default());

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.dependency_count(), 0);
    }

    #[test]
    fn every_non_root_node_has_an_inbound_edge() {
        let graph = build(&diamond(), &RootSpec::Component("app".into()), BuildOptions::default());
        assert!(graph.validate().is_empty(), "{:?}", graph.validate());
        for node in graph.nodes().filter(|n| !n.is_root()) {
            assert!(inbound(&graph, node.name()) >= 1, "{} is unreachable", node.name());
        }
    }
}

mod roots {
    use super::*;

    #[test]
    fn describes_points_at_component_root() {
        let graph = build(&diamond(), &RootSpec::Component("app".into()), BuildOptions::default());
        let describes: Vec<_> = graph
            .relationships()
            .iter()
            .filter(|r| r.kind == RelationshipKind::Describes)
            .collect();

        assert_eq!(describes.len(), 1);
        assert_eq!(describes[0].from, NodeRef::Document);
        assert_eq!(graph.root().map(|n| n.role), Some(PackageRole::Application));
    }

    #[test]
    fn environment_root_depends_on_every_installed_package() {
        let options = BuildOptions {
            environment_name: "venv".to_string(),
            ..BuildOptions::default()
        };
        let graph = build(&diamond(), &RootSpec::Environment, options);

        assert_eq!(graph.root().map(|n| n.name()), Some("venv"));
        assert_eq!(graph.node_count(), 5);
        let root = graph.root_index().expect("root");
        assert_eq!(graph.dependencies_of(root).len(), 4);
    }

    #[test]
    fn manifest_root_carries_evidence() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("requirements.txt");
        std::fs::write(&path, "# pinned\nleft==1.0\nright ; python_version > '3.8'\nmissing\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let graph = build(&diamond(), &RootSpec::Manifest(manifest), BuildOptions::default());

        let root = graph.root().expect("synthetic root");
        assert_eq!(root.role, PackageRole::Application);
        let left = graph.find_by_name("left").expect("left present");
        assert_eq!(left.evidence.as_deref(), Some(path.display().to_string().as_str()));
        // `missing` has no metadata and is dropped
        assert!(graph.find_by_name("missing").is_none());
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn unknown_component_gives_empty_graph() {
        let graph = build(&diamond(), &RootSpec::Component("nope".into()), BuildOptions::default());
        assert!(graph.root().is_none());
        assert_eq!(graph.node_count(), 0);
    }
}

mod attributes {
    use super::*;

    #[test]
    fn licenses_are_resolved_through_synonyms() {
        let graph = build(&diamond(), &RootSpec::Component("app".into()), BuildOptions::default());
        let shared = graph.find_by_name("shared").unwrap();

        assert_eq!(shared.license.declared, "Apache 2.0");
        assert_eq!(shared.license.resolved, "Apache-2.0");
        assert!(shared.license.is_valid_spdx);
        assert!(shared.license.comment.is_none());
    }

    #[test]
    fn unresolvable_license_gets_comment() {
        let provider = MemoryProvider::new().with(package("odd", "0.1", "Not A Real License", ""));
        let graph = build(&provider, &RootSpec::Component("odd".into()), BuildOptions::default());
        let odd = graph.root().unwrap();

        assert_eq!(odd.license.resolved, "UNKNOWN");
        assert!(!odd.license.is_valid_spdx);
        assert!(odd
            .license
            .comment
            .as_deref()
            .is_some_and(|c| c.contains("Not A Real License")));
    }

    #[test]
    fn purl_uses_package_manager() {
        let options = BuildOptions {
            package_manager: "conda".to_string(),
            ..BuildOptions::default()
        };
        let graph = build(&diamond(), &RootSpec::Component("app".into()), options);
        assert_eq!(graph.root().unwrap().purl.as_deref(), Some("pkg:conda/app@1.0"));
    }

    #[test]
    fn name_spellings_normalize_to_one_node() {
        let provider = MemoryProvider::new()
            .with(package("app", "1.0", "MIT", "child, child2"))
            .with(package("child", "1.0", "MIT", "shared"))
            .with(package("child2", "1.0", "MIT", "Shared"))
            .with(package("shared", "1.0", "MIT", ""));
        let graph = build(&provider, &RootSpec::Component("app".into()), BuildOptions::default());

        assert_eq!(graph.nodes().filter(|n| n.name() == "shared").count(), 1);
        assert!(graph.conflicts().is_empty());
    }

    #[test]
    fn installed_files_become_contains_edges() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("app")).unwrap();
        std::fs::write(tmp.path().join("app/__init__.py"), "VERSION = '1.0'\n").unwrap();

        let provider = MemoryProvider::new().with(
            package("app", "1.0", "MIT", "")
                .with("Location", tmp.path().display().to_string())
                .with_files(vec!["app/__init__.py".to_string(), "app/gone.py".to_string()]),
        );
        let options = BuildOptions {
            include_files: true,
            ..BuildOptions::default()
        };
        let graph = build(&provider, &RootSpec::Component("app".into()), options);

        assert_eq!(graph.files().len(), 2);
        let contains = graph
            .relationships()
            .iter()
            .filter(|r| r.kind == RelationshipKind::Contains)
            .count();
        assert_eq!(contains, 2);
        assert!(graph.files()[0].checksum.is_some());
        assert!(graph.files()[1].checksum.is_none());
    }
}

mod parallel {
    use super::*;

    #[test]
    fn prefetch_produces_identical_graph() {
        let sequential = build(&diamond(), &RootSpec::Environment, BuildOptions::default());
        let parallel = build(
            &diamond(),
            &RootSpec::Environment,
            BuildOptions {
                jobs: 4,
                ..BuildOptions::default()
            },
        );

        assert_eq!(sequential.fingerprint(), parallel.fingerprint());
        assert_eq!(sequential.relationships(), parallel.relationships());
    }
}
