//! End-to-end document generation tests against frozen metadata.

use sbom_builder::document::{
    serializer_for, DocumentGenerator, Encoding, FixedIds, GeneratorOptions, OutputFormat,
    RandomIds, SbomDocument, SbomType,
};
use sbom_builder::graph::{GraphBuilder, RootSpec};
use sbom_builder::license::{LicenseResolver, LicenseTable};
use sbom_builder::provider::{MemoryProvider, PackageMetadata};
use sbom_builder::DependencyGraph;

// ============================================================================
// Helpers
// ============================================================================

fn package(name: &str, version: &str, license: &str, requires: &str) -> PackageMetadata {
    PackageMetadata::new()
        .with("Name", name)
        .with("Version", version)
        .with("License", license)
        .with("Author", "Jane Doe")
        .with("Author-email", "jane@example.com")
        .with("Requires", requires)
}

fn build(provider: &MemoryProvider, root: &str) -> (DependencyGraph, String) {
    let resolver = LicenseResolver::new(LicenseTable::builtin());
    let graph = GraphBuilder::new(provider, &resolver)
        .build(&RootSpec::Component(root.to_string()))
        .expect("build should succeed");
    (graph, resolver.table().version().to_string())
}

fn document(provider: &MemoryProvider, root: &str, options: GeneratorOptions) -> SbomDocument {
    let (graph, version) = build(provider, root);
    DocumentGenerator::from_graph(&graph, &version, &FixedIds::default(), options)
        .expect("generation should succeed")
}

fn render(document: &SbomDocument, sbom: SbomType, encoding: Encoding) -> String {
    serializer_for(OutputFormat::new(sbom, encoding))
        .serialize(document)
        .expect("serialization should succeed")
}

fn all_formats() -> Vec<OutputFormat> {
    vec![
        OutputFormat::new(SbomType::Spdx, Encoding::Tag),
        OutputFormat::new(SbomType::Spdx, Encoding::Json),
        OutputFormat::new(SbomType::Spdx, Encoding::Yaml),
        OutputFormat::new(SbomType::CycloneDx, Encoding::Json),
        OutputFormat::new(SbomType::CycloneDx, Encoding::Xml),
    ]
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn single_root_spdx_tag() {
        let provider = MemoryProvider::new().with(package("alpha", "1.0", "MIT", ""));
        let doc = document(&provider, "alpha", GeneratorOptions::default());
        let out = render(&doc, SbomType::Spdx, Encoding::Tag);

        assert_eq!(out.matches("PackageName: alpha\n").count(), 1);
        assert_eq!(
            out.matches("Relationship: SPDXRef-DOCUMENT DESCRIBES SPDXRef-Package-1-alpha\n")
                .count(),
            1
        );
        assert!(out.contains("PackageLicenseDeclared: MIT\n"));
        assert!(out.contains("PackageLicenseConcluded: MIT\n"));
    }

    #[test]
    fn cycle_yields_two_packages() {
        let provider = MemoryProvider::new()
            .with(package("alpha", "1.0", "MIT", "beta"))
            .with(package("beta", "1.0", "MIT", "alpha"));
        let doc = document(&provider, "alpha", GeneratorOptions::default());
        let out = render(&doc, SbomType::Spdx, Encoding::Tag);

        assert_eq!(doc.packages.len(), 2);
        assert_eq!(out.matches("PackageName: ").count(), 2);
        assert!(out.contains(
            "Relationship: SPDXRef-Package-1-alpha DEPENDS_ON SPDXRef-Package-2-beta\n"
        ));
        assert!(out.contains(
            "Relationship: SPDXRef-Package-2-beta DEPENDS_ON SPDXRef-Package-1-alpha\n"
        ));
    }

    #[test]
    fn cyclonedx_groups_dependencies_per_ref() {
        let provider = MemoryProvider::new()
            .with(package("root", "1.0", "MIT", "x, y"))
            .with(package("x", "1.0", "MIT", ""))
            .with(package("y", "1.0", "MIT", ""));
        let doc = document(&provider, "root", GeneratorOptions::default());
        let json: serde_json::Value =
            serde_json::from_str(&render(&doc, SbomType::CycloneDx, Encoding::Json)).unwrap();

        let deps = json["dependencies"].as_array().unwrap();
        let root_entries: Vec<_> = deps.iter().filter(|d| d["ref"] == "1-root").collect();
        assert_eq!(root_entries.len(), 1);
        assert_eq!(
            root_entries[0]["dependsOn"],
            serde_json::json!(["2-x", "3-y"])
        );
        assert_eq!(json["metadata"]["component"]["bom-ref"], "1-root");
        assert_eq!(json["components"].as_array().unwrap().len(), 2);
    }
}

// ============================================================================
// Licenses
// ============================================================================

mod licenses {
    use super::*;

    #[test]
    fn unknown_license_is_noassertion_with_comment() {
        let provider =
            MemoryProvider::new().with(package("odd", "0.1", "Not A Real License", ""));
        let doc = document(&provider, "odd", GeneratorOptions::default());
        let out = render(&doc, SbomType::Spdx, Encoding::Tag);

        assert!(out.contains("PackageLicenseConcluded: NOASSERTION\n"));
        assert!(out.contains("PackageLicenseDeclared: NOASSERTION\n"));
        let comment = out
            .lines()
            .find(|l| l.starts_with("PackageLicenseComments:"))
            .expect("license comment");
        assert!(comment.contains("Not A Real License"));
    }

    #[test]
    fn suppressed_licenses_are_noassertion_everywhere() {
        let provider = MemoryProvider::new().with(package("alpha", "1.0", "MIT", ""));
        let options = GeneratorOptions {
            include_license: false,
            ..GeneratorOptions::default()
        };
        let doc = document(&provider, "alpha", options);

        let tag = render(&doc, SbomType::Spdx, Encoding::Tag);
        assert!(tag.contains("PackageLicenseDeclared: NOASSERTION\n"));
        assert!(!tag.contains("PackageLicenseComments:"));

        let cdx: serde_json::Value =
            serde_json::from_str(&render(&doc, SbomType::CycloneDx, Encoding::Json)).unwrap();
        assert!(cdx["metadata"]["component"].get("licenses").is_none());
    }

    #[test]
    fn synonym_resolves_in_spdx_json() {
        let provider = MemoryProvider::new().with(package("alpha", "1.0", "Apache 2.0", ""));
        let doc = document(&provider, "alpha", GeneratorOptions::default());
        let json: serde_json::Value =
            serde_json::from_str(&render(&doc, SbomType::Spdx, Encoding::Json)).unwrap();

        assert_eq!(json["packages"][0]["licenseDeclared"], "Apache-2.0");
        assert_eq!(json["relationships"][0]["relationshipType"], "DESCRIBES");
        assert_eq!(json["relationships"][0]["spdxElementId"], "SPDXRef-DOCUMENT");
    }
}

// ============================================================================
// Determinism and ordering
// ============================================================================

mod determinism {
    use super::*;

    fn universe() -> MemoryProvider {
        MemoryProvider::new()
            .with(package("app", "1.0", "MIT", "zeta, alpha, mid"))
            .with(package("zeta", "1.0", "BSD License", "alpha"))
            .with(package("alpha", "2.0", "Apache 2.0", ""))
            .with(package("mid", "0.3", "Not A Real License", "zeta"))
    }

    #[test]
    fn fixed_ids_give_byte_identical_output() {
        for format in all_formats() {
            let first = render(
                &document(&universe(), "app", GeneratorOptions::default()),
                format.sbom,
                format.encoding,
            );
            let second = render(
                &document(&universe(), "app", GeneratorOptions::default()),
                format.sbom,
                format.encoding,
            );
            assert_eq!(first, second, "{format} output differs between runs");
        }
    }

    #[test]
    fn random_ids_only_change_identity_lines() {
        let (graph, version) = build(&universe(), "app");
        let strip = |doc: SbomDocument| -> Vec<String> {
            render(&doc, SbomType::Spdx, Encoding::Tag)
                .lines()
                .filter(|l| !l.starts_with("DocumentNamespace:") && !l.starts_with("Created:"))
                .map(String::from)
                .collect()
        };
        let first = DocumentGenerator::from_graph(&graph, &version, &RandomIds, GeneratorOptions::default())
            .unwrap();
        let second = DocumentGenerator::from_graph(&graph, &version, &RandomIds, GeneratorOptions::default())
            .unwrap();

        assert_ne!(first.header.instance, second.header.instance);
        assert_eq!(strip(first), strip(second));
    }

    #[test]
    fn relationships_are_sorted() {
        let doc = document(&universe(), "app", GeneratorOptions::default());
        let keys: Vec<_> = doc.relationships.iter().map(|r| r.sort_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let tag = render(&doc, SbomType::Spdx, Encoding::Tag);
        let lines: Vec<&str> = tag.lines().filter(|l| l.starts_with("Relationship:")).collect();
        assert_eq!(lines.len(), doc.relationships.len());
    }

    #[test]
    fn all_encodings_describe_the_same_packages() {
        let doc = document(&universe(), "app", GeneratorOptions::default());
        for format in all_formats() {
            let out = render(&doc, format.sbom, format.encoding);
            for package in &doc.packages {
                assert!(out.contains(&package.name), "{format} is missing {}", package.name);
            }
        }
    }

    #[test]
    fn cyclonedx_xml_has_bom_structure() {
        let doc = document(&universe(), "app", GeneratorOptions::default());
        let xml = render(&doc, SbomType::CycloneDx, Encoding::Xml);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<bom xmlns=\"http://cyclonedx.org/schema/bom/1.4\""));
        assert!(xml.contains("serialNumber=\"urn:uuid:00000000-0000-0000-0000-000000000000\""));
        assert!(xml.contains("<dependency ref=\"1-app\">"));
    }
}
