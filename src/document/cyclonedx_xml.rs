//! CycloneDX XML serializer.

use super::cyclonedx_json::{external_references, properties, LicenseChoice};
use super::format::{Encoding, OutputFormat, SbomType};
use super::model::{FileEntryDoc, PackageEntry, SbomDocument, CYCLONEDX_SPEC_VERSION};
use super::serializer::DocumentSerializer;
use crate::error::{GenerateErrorKind, Result, SbomError};
use crate::model::Checksum;
use serde::Serialize;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// CycloneDX 1.4 XML
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxXmlSerializer;

impl DocumentSerializer for CycloneDxXmlSerializer {
    fn serialize(&self, document: &SbomDocument) -> Result<String> {
        let bom = CdxBomXml::from(document);
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        bom.serialize(serializer).map_err(|e| {
            SbomError::generate("writing CycloneDX XML", GenerateErrorKind::Xml(e.to_string()))
        })?;
        Ok(format!("{XML_DECLARATION}\n{body}\n"))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::new(SbomType::CycloneDx, Encoding::Xml)
    }
}

// CycloneDX XML structures for serialization

#[derive(Debug, Serialize)]
#[serde(rename = "bom")]
struct CdxBomXml<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: String,
    #[serde(rename = "@serialNumber")]
    serial_number: String,
    #[serde(rename = "@version")]
    version: u32,
    metadata: CdxMetadataXml<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<CdxComponentsXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<CdxDependenciesXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxMetadataXml<'a> {
    timestamp: String,
    tools: CdxToolsXml<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<CdxComponentXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxToolsXml<'a> {
    tool: Vec<CdxToolXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxToolXml<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxComponentsXml<'a> {
    component: Vec<CdxComponentXml<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponentXml<'a> {
    #[serde(rename = "@type")]
    component_type: &'static str,
    #[serde(rename = "@bom-ref")]
    bom_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<CdxSupplierXml<'a>>,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hashes: Option<CdxHashesXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<CdxLicensesXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cpe: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_references: Option<CdxExternalReferencesXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<CdxPropertiesXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxSupplierXml<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<CdxContactXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxContactXml<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxHashesXml<'a> {
    hash: Vec<CdxHashXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxHashXml<'a> {
    #[serde(rename = "@alg")]
    alg: &'static str,
    #[serde(rename = "$text")]
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxLicensesXml<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<CdxLicenseXml<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CdxLicenseXml<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CdxExternalReferencesXml<'a> {
    reference: Vec<CdxExternalReferenceXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxExternalReferenceXml<'a> {
    #[serde(rename = "@type")]
    ref_type: &'static str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxPropertiesXml<'a> {
    property: Vec<CdxPropertyXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxPropertyXml<'a> {
    #[serde(rename = "@name")]
    name: &'static str,
    #[serde(rename = "$text")]
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct CdxDependenciesXml<'a> {
    dependency: Vec<CdxDependencyXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxDependencyXml<'a> {
    #[serde(rename = "@ref")]
    dep_ref: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependency: Vec<CdxDependencyRefXml<'a>>,
}

#[derive(Debug, Serialize)]
struct CdxDependencyRefXml<'a> {
    #[serde(rename = "@ref")]
    dep_ref: &'a str,
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn hashes(checksum: Option<&Checksum>) -> Option<CdxHashesXml<'_>> {
    checksum.map(|c| CdxHashesXml {
        hash: vec![CdxHashXml {
            alg: c.algorithm.cyclonedx_name(),
            content: &c.value,
        }],
    })
}

impl<'a> From<&'a SbomDocument> for CdxBomXml<'a> {
    fn from(document: &'a SbomDocument) -> Self {
        let header = &document.header;
        let root = document.root();
        let mut components: Vec<CdxComponentXml<'a>> = document
            .packages
            .iter()
            .filter(|p| root.map_or(true, |r| r.element != p.element))
            .map(CdxComponentXml::from)
            .collect();
        components.extend(document.files.iter().map(CdxComponentXml::from));

        let dependencies: Vec<CdxDependencyXml<'a>> = document
            .dependency_groups()
            .into_iter()
            .filter_map(|(from, targets)| {
                Some(CdxDependencyXml {
                    dep_ref: from.bom_ref()?,
                    dependency: targets
                        .into_iter()
                        .filter_map(|t| t.bom_ref())
                        .map(|dep_ref| CdxDependencyRefXml { dep_ref })
                        .collect(),
                })
            })
            .collect();

        Self {
            xmlns: format!("http://cyclonedx.org/schema/bom/{CYCLONEDX_SPEC_VERSION}"),
            serial_number: header.serial_number(),
            version: 1,
            metadata: CdxMetadataXml {
                timestamp: header.created_timestamp(),
                tools: CdxToolsXml {
                    tool: vec![CdxToolXml {
                        name: &header.tool_name,
                        version: &header.tool_version,
                    }],
                },
                component: root.map(CdxComponentXml::from),
            },
            components: non_empty(components).map(|component| CdxComponentsXml { component }),
            dependencies: non_empty(dependencies).map(|dependency| CdxDependenciesXml { dependency }),
        }
    }
}

impl<'a> From<&'a PackageEntry> for CdxComponentXml<'a> {
    fn from(package: &'a PackageEntry) -> Self {
        let supplier = (!package.supplier.is_unknown()).then(|| CdxSupplierXml {
            name: &package.supplier.name,
            contact: package.supplier.email.as_deref().map(|email| CdxContactXml { email }),
        });
        let licenses = LicenseChoice::of(package).map(|choice| match choice {
            LicenseChoice::Id(id) => CdxLicensesXml {
                license: Some(CdxLicenseXml { id: Some(id), name: None }),
                expression: None,
            },
            LicenseChoice::Name(name) => CdxLicensesXml {
                license: Some(CdxLicenseXml { id: None, name: Some(name) }),
                expression: None,
            },
            LicenseChoice::Expression(expression) => CdxLicensesXml {
                license: None,
                expression: Some(expression),
            },
        });
        let references = external_references(package)
            .into_iter()
            .map(|(ref_type, url)| CdxExternalReferenceXml { ref_type, url })
            .collect();
        let property = properties(package)
            .into_iter()
            .map(|(name, value)| CdxPropertyXml { name, value })
            .collect();

        Self {
            component_type: package.role.as_str(),
            bom_ref: package.element.bom_ref().unwrap_or_default(),
            supplier,
            name: &package.name,
            version: package.version.as_deref(),
            description: package.summary.as_deref(),
            hashes: hashes(package.checksum.as_ref()),
            licenses,
            cpe: package.cpe.as_deref(),
            purl: package.purl.as_deref(),
            external_references: non_empty(references).map(|reference| CdxExternalReferencesXml { reference }),
            properties: non_empty(property).map(|property| CdxPropertiesXml { property }),
        }
    }
}

impl<'a> From<&'a FileEntryDoc> for CdxComponentXml<'a> {
    fn from(file: &'a FileEntryDoc) -> Self {
        Self {
            component_type: "file",
            bom_ref: file.element.bom_ref().unwrap_or_default(),
            supplier: None,
            name: &file.name,
            version: None,
            description: None,
            hashes: hashes(file.checksum.as_ref()),
            licenses: None,
            cpe: None,
            purl: None,
            external_references: None,
            properties: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentGenerator, ElementRef, FixedIds, GeneratorOptions};
    use crate::model::{PackageId, PackageNode, PackageRole, RelationshipKind};

    fn package(name: &str, role: PackageRole) -> PackageNode {
        let mut node = PackageNode::new(PackageId::new(name, Some("1.0")), role);
        node.license.declared = "Apache 2.0".to_string();
        node.license.resolved = "Apache-2.0".to_string();
        node.license.is_valid_spdx = true;
        node.summary = Some("Fish & chips <tasty>".to_string());
        node.purl = Some(format!("pkg:pypi/{name}@1.0"));
        node
    }

    fn document() -> SbomDocument {
        let mut generator =
            DocumentGenerator::new("root", "3.21", &FixedIds::default(), GeneratorOptions::default());
        let root = generator.add_package(&package("root", PackageRole::Application)).expect("add");
        let child = generator.add_package(&package("child", PackageRole::Library)).expect("add");
        generator
            .add_relationship(ElementRef::Document, root.clone(), RelationshipKind::Describes)
            .expect("relate");
        generator
            .add_relationship(root, child, RelationshipKind::DependsOn)
            .expect("relate");
        generator.into_document()
    }

    #[test]
    fn test_xml_structure() {
        let out = CycloneDxXmlSerializer.serialize(&document()).expect("serialize");
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<bom"));
        assert!(out.contains("xmlns=\"http://cyclonedx.org/schema/bom/1.4\""));
        assert!(out.contains("serialNumber=\"urn:uuid:00000000-0000-0000-0000-000000000000\""));
        assert!(out.contains("<component type=\"application\" bom-ref=\"1-root\">"));
        assert!(out.contains("<component type=\"library\" bom-ref=\"2-child\">"));
        assert!(out.contains("<id>Apache-2.0</id>"));
        assert!(out.contains("<purl>pkg:pypi/child@1.0</purl>"));
        assert!(out.contains("<dependency ref=\"1-root\">"));
        assert!(out.contains("<dependency ref=\"2-child\"/>"));
        assert!(out.trim_end().ends_with("</bom>"));
    }

    #[test]
    fn test_xml_escapes_text() {
        let out = CycloneDxXmlSerializer.serialize(&document()).expect("serialize");
        assert!(out.contains("Fish &amp; chips &lt;tasty"));
        assert!(!out.contains("<tasty>"));
    }
}
