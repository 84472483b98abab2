//! CycloneDX JSON serializer and the component mapping shared with XML.

use super::format::{Encoding, OutputFormat, SbomType};
use super::model::{FileEntryDoc, PackageEntry, SbomDocument, CYCLONEDX_SPEC_VERSION};
use super::serializer::DocumentSerializer;
use crate::error::{GenerateErrorKind, Result, SbomError};
use serde::Serialize;

pub(super) const PROPERTY_LICENSE_COMMENT: &str = "sbom-builder:license:comment";
pub(super) const PROPERTY_EVIDENCE: &str = "sbom-builder:evidence";

/// CycloneDX 1.4 JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxJsonSerializer;

impl DocumentSerializer for CycloneDxJsonSerializer {
    fn serialize(&self, document: &SbomDocument) -> Result<String> {
        serde_json::to_string_pretty(&CdxBom::from(document)).map_err(|e| {
            SbomError::generate("writing CycloneDX JSON", GenerateErrorKind::Json(e.to_string()))
        })
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::new(SbomType::CycloneDx, Encoding::Json)
    }
}

/// License choice for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LicenseChoice<'a> {
    Id(&'a str),
    Expression(&'a str),
    Name(&'a str),
}

impl<'a> LicenseChoice<'a> {
    /// Resolved identifiers become `id` (or `expression` when compound),
    /// unresolved declarations become `name`; nothing when suppressed.
    pub(super) fn of(package: &'a PackageEntry) -> Option<Self> {
        if !package.license_included {
            return None;
        }
        match package.license.as_deref() {
            Some(id) if id.contains(' ') => Some(Self::Expression(id)),
            Some(id) => Some(Self::Id(id)),
            None if package.declared_license.trim().is_empty() => None,
            None => Some(Self::Name(package.declared_license.trim())),
        }
    }
}

/// `(type, url)` pairs for the homepage and download location
pub(super) fn external_references(package: &PackageEntry) -> Vec<(&'static str, &str)> {
    let mut references = Vec::new();
    if let Some(homepage) = &package.homepage {
        references.push(("website", homepage.as_str()));
    }
    if let Some(download) = &package.download_location {
        references.push(("distribution", download.as_str()));
    }
    references
}

/// `(name, value)` properties carrying data CycloneDX has no field for
pub(super) fn properties(package: &PackageEntry) -> Vec<(&'static str, &str)> {
    let mut properties = Vec::new();
    if let Some(comment) = &package.license_comment {
        properties.push((PROPERTY_LICENSE_COMMENT, comment.as_str()));
    }
    if let Some(evidence) = &package.evidence {
        properties.push((PROPERTY_EVIDENCE, evidence.as_str()));
    }
    properties
}

// CycloneDX JSON structures for serialization

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxBom<'a> {
    bom_format: &'static str,
    spec_version: &'static str,
    serial_number: String,
    version: u32,
    metadata: CdxMetadata<'a>,
    components: Vec<CdxComponent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<CdxDependency<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxMetadata<'a> {
    timestamp: String,
    tools: Vec<CdxTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<CdxComponent<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxTool<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponent<'a> {
    #[serde(rename = "type")]
    component_type: &'static str,
    #[serde(rename = "bom-ref")]
    bom_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<CdxSupplier<'a>>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<CdxHash<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<CdxLicenseChoice<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpe: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_references: Vec<CdxExternalReference<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<CdxProperty<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxSupplier<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    contact: Vec<CdxContact<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxContact<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxHash<'a> {
    alg: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CdxLicenseChoice<'a> {
    License { license: CdxLicense<'a> },
    Expression { expression: &'a str },
}

#[derive(Debug, Serialize)]
struct CdxLicense<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CdxExternalReference<'a> {
    #[serde(rename = "type")]
    ref_type: &'static str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxProperty<'a> {
    name: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxDependency<'a> {
    #[serde(rename = "ref")]
    dep_ref: &'a str,
    depends_on: Vec<&'a str>,
}

impl<'a> From<&'a SbomDocument> for CdxBom<'a> {
    fn from(document: &'a SbomDocument) -> Self {
        let header = &document.header;
        let root = document.root();
        let mut components: Vec<CdxComponent<'a>> = document
            .packages
            .iter()
            .filter(|p| root.map_or(true, |r| r.element != p.element))
            .map(CdxComponent::from)
            .collect();
        components.extend(document.files.iter().map(CdxComponent::from));

        let dependencies = document
            .dependency_groups()
            .into_iter()
            .filter_map(|(from, targets)| {
                Some(CdxDependency {
                    dep_ref: from.bom_ref()?,
                    depends_on: targets.into_iter().filter_map(|t| t.bom_ref()).collect(),
                })
            })
            .collect();

        Self {
            bom_format: "CycloneDX",
            spec_version: CYCLONEDX_SPEC_VERSION,
            serial_number: header.serial_number(),
            version: 1,
            metadata: CdxMetadata {
                timestamp: header.created_timestamp(),
                tools: vec![CdxTool {
                    name: &header.tool_name,
                    version: &header.tool_version,
                }],
                component: root.map(CdxComponent::from),
            },
            components,
            dependencies,
        }
    }
}

impl<'a> From<&'a PackageEntry> for CdxComponent<'a> {
    fn from(package: &'a PackageEntry) -> Self {
        let supplier = (!package.supplier.is_unknown()).then(|| CdxSupplier {
            name: &package.supplier.name,
            contact: package
                .supplier
                .email
                .as_deref()
                .map(|email| CdxContact { email })
                .into_iter()
                .collect(),
        });
        let licenses = LicenseChoice::of(package)
            .map(|choice| match choice {
                LicenseChoice::Id(id) => CdxLicenseChoice::License {
                    license: CdxLicense { id: Some(id), name: None },
                },
                LicenseChoice::Name(name) => CdxLicenseChoice::License {
                    license: CdxLicense { id: None, name: Some(name) },
                },
                LicenseChoice::Expression(expression) => CdxLicenseChoice::Expression { expression },
            })
            .into_iter()
            .collect();

        Self {
            component_type: package.role.as_str(),
            bom_ref: package.element.bom_ref().unwrap_or_default(),
            supplier,
            name: &package.name,
            version: package.version.as_deref(),
            description: package.summary.as_deref(),
            hashes: package
                .checksum
                .iter()
                .map(|c| CdxHash {
                    alg: c.algorithm.cyclonedx_name(),
                    content: &c.value,
                })
                .collect(),
            licenses,
            cpe: package.cpe.as_deref(),
            purl: package.purl.as_deref(),
            external_references: external_references(package)
                .into_iter()
                .map(|(ref_type, url)| CdxExternalReference { ref_type, url })
                .collect(),
            properties: properties(package)
                .into_iter()
                .map(|(name, value)| CdxProperty { name, value })
                .collect(),
        }
    }
}

impl<'a> From<&'a FileEntryDoc> for CdxComponent<'a> {
    fn from(file: &'a FileEntryDoc) -> Self {
        Self {
            component_type: "file",
            bom_ref: file.element.bom_ref().unwrap_or_default(),
            supplier: None,
            name: &file.name,
            version: None,
            description: None,
            hashes: file
                .checksum
                .iter()
                .map(|c| CdxHash {
                    alg: c.algorithm.cyclonedx_name(),
                    content: &c.value,
                })
                .collect(),
            licenses: Vec::new(),
            cpe: None,
            purl: None,
            external_references: Vec::new(),
            properties: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentGenerator, ElementRef, FixedIds, GeneratorOptions};
    use crate::model::{PackageId, PackageNode, PackageRole, RelationshipKind, Supplier, SupplierKind};
    use serde_json::Value;

    fn package(name: &str, role: PackageRole) -> PackageNode {
        let mut node = PackageNode::new(PackageId::new(name, Some("1.0")), role);
        node.license.declared = "MIT".to_string();
        node.license.resolved = "MIT".to_string();
        node.license.is_valid_spdx = true;
        node
    }

    #[test]
    fn test_dependencies_grouped_per_ref() {
        let mut generator =
            DocumentGenerator::new("root", "3.21", &FixedIds::default(), GeneratorOptions::default());
        let root = generator.add_package(&package("root", PackageRole::Application)).expect("add");
        let left = generator.add_package(&package("left", PackageRole::Library)).expect("add");
        let right = generator.add_package(&package("right", PackageRole::Library)).expect("add");
        generator
            .add_relationship(ElementRef::Document, root.clone(), RelationshipKind::Describes)
            .expect("relate");
        generator
            .add_relationship(root.clone(), left, RelationshipKind::DependsOn)
            .expect("relate");
        generator
            .add_relationship(root, right, RelationshipKind::DependsOn)
            .expect("relate");
        let document = generator.into_document();

        let out = CycloneDxJsonSerializer.serialize(&document).expect("serialize");
        let json: Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(json["bomFormat"], "CycloneDX");
        assert_eq!(json["specVersion"], "1.4");
        assert_eq!(json["serialNumber"], "urn:uuid:00000000-0000-0000-0000-000000000000");
        assert_eq!(json["metadata"]["component"]["type"], "application");
        assert_eq!(json["metadata"]["component"]["bom-ref"], "1-root");

        let dependencies = json["dependencies"].as_array().expect("dependencies");
        assert_eq!(dependencies.len(), 1);
        assert_eq!(dependencies[0]["ref"], "1-root");
        assert_eq!(dependencies[0]["dependsOn"], serde_json::json!(["2-left", "3-right"]));

        let components = json["components"].as_array().expect("components");
        assert_eq!(components.len(), 2);
        assert_eq!(components[0]["licenses"][0]["license"]["id"], "MIT");
    }

    #[test]
    fn test_component_fields() {
        let mut node = package("beta", PackageRole::Library);
        node.license.declared = "Custom Thing".to_string();
        node.license.resolved = "UNKNOWN".to_string();
        node.license.is_valid_spdx = false;
        node.license.comment = Some("unresolved".to_string());
        node.supplier = Supplier {
            kind: SupplierKind::Person,
            name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
        };
        node.homepage = Some("https://beta.example".to_string());

        let mut generator =
            DocumentGenerator::new("beta", "3.21", &FixedIds::default(), GeneratorOptions::default());
        generator.add_package(&node).expect("add");
        let document = generator.into_document();
        let component = CdxComponent::from(&document.packages[0]);
        let json = serde_json::to_value(&component).expect("serialize");

        assert_eq!(json["licenses"][0]["license"]["name"], "Custom Thing");
        assert_eq!(json["supplier"]["name"], "Jane Doe");
        assert_eq!(json["supplier"]["contact"][0]["email"], "jane@example.com");
        assert_eq!(json["externalReferences"][0]["type"], "website");
        assert_eq!(json["properties"][0]["name"], PROPERTY_LICENSE_COMMENT);
        assert!(json.get("cpe").is_none());
    }

    #[test]
    fn test_license_choice() {
        let mut generator =
            DocumentGenerator::new("x", "3.21", &FixedIds::default(), GeneratorOptions::default());
        let mut node = package("x", PackageRole::Library);
        node.license.resolved = "MIT OR Apache-2.0".to_string();
        generator.add_package(&node).expect("add");
        let document = generator.into_document();
        assert_eq!(
            LicenseChoice::of(&document.packages[0]),
            Some(LicenseChoice::Expression("MIT OR Apache-2.0"))
        );
    }
}
