//! SPDX JSON and YAML serializers.
//!
//! Both encodings share one serde tree; only the final writer differs.

use super::format::{Encoding, OutputFormat, SbomType};
use super::model::{
    ElementRef, FileEntryDoc, PackageEntry, SbomDocument, CREATOR_COMMENT, DATA_LICENSE,
    NOASSERTION, SPDX_VERSION,
};
use super::serializer::DocumentSerializer;
use crate::error::{GenerateErrorKind, Result, SbomError};
use crate::model::{Checksum, RelationshipKind};
use serde::Serialize;

/// SPDX 2.3 JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxJsonSerializer;

impl DocumentSerializer for SpdxJsonSerializer {
    fn serialize(&self, document: &SbomDocument) -> Result<String> {
        serde_json::to_string_pretty(&SpdxDocument::from(document))
            .map_err(|e| SbomError::generate("writing SPDX JSON", GenerateErrorKind::Json(e.to_string())))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::new(SbomType::Spdx, Encoding::Json)
    }
}

/// SPDX 2.3 YAML
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxYamlSerializer;

impl DocumentSerializer for SpdxYamlSerializer {
    fn serialize(&self, document: &SbomDocument) -> Result<String> {
        serde_yaml::to_string(&SpdxDocument::from(document))
            .map_err(|e| SbomError::generate("writing SPDX YAML", GenerateErrorKind::Yaml(e.to_string())))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::new(SbomType::Spdx, Encoding::Yaml)
    }
}

// SPDX JSON structures for serialization

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument<'a> {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    spdx_version: &'static str,
    creation_info: SpdxCreationInfo<'a>,
    name: &'a str,
    data_license: &'static str,
    document_namespace: String,
    document_describes: Vec<String>,
    packages: Vec<SpdxPackage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    files: Vec<SpdxFile<'a>>,
    relationships: Vec<SpdxRelationship>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxCreationInfo<'a> {
    comment: &'static str,
    created: String,
    creators: Vec<String>,
    license_list_version: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage<'a> {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_info: Option<&'a str>,
    supplier: String,
    download_location: &'a str,
    files_analyzed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<SpdxChecksum<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<&'a str>,
    license_concluded: &'a str,
    license_declared: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_comments: Option<&'a str>,
    copyright_text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<SpdxExternalRef<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxFile<'a> {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    file_name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<SpdxChecksum<'a>>,
    license_concluded: &'static str,
    copyright_text: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxChecksum<'a> {
    algorithm: &'static str,
    checksum_value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef<'a> {
    reference_category: &'static str,
    reference_type: &'static str,
    reference_locator: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: String,
    relationship_type: &'static str,
    related_spdx_element: String,
}

impl<'a> From<&'a SbomDocument> for SpdxDocument<'a> {
    fn from(document: &'a SbomDocument) -> Self {
        let header = &document.header;
        let document_describes = document
            .relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::Describes && r.from == ElementRef::Document)
            .map(|r| r.to.spdx_id())
            .collect();
        Self {
            spdx_id: ElementRef::Document.spdx_id(),
            spdx_version: SPDX_VERSION,
            creation_info: SpdxCreationInfo {
                comment: CREATOR_COMMENT,
                created: header.created_timestamp(),
                creators: vec![header.creator()],
                license_list_version: &header.license_list_version,
            },
            name: &header.name,
            data_license: DATA_LICENSE,
            document_namespace: header.namespace(),
            document_describes,
            packages: document.packages.iter().map(SpdxPackage::from).collect(),
            files: document.files.iter().map(SpdxFile::from).collect(),
            relationships: document
                .relationships
                .iter()
                .map(|r| SpdxRelationship {
                    spdx_element_id: r.from.spdx_id(),
                    relationship_type: r.kind.as_str(),
                    related_spdx_element: r.to.spdx_id(),
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a PackageEntry> for SpdxPackage<'a> {
    fn from(package: &'a PackageEntry) -> Self {
        let mut external_refs = Vec::new();
        if let Some(purl) = &package.purl {
            external_refs.push(SpdxExternalRef {
                reference_category: "PACKAGE-MANAGER",
                reference_type: "purl",
                reference_locator: purl,
            });
        }
        if let Some(cpe) = &package.cpe {
            external_refs.push(SpdxExternalRef {
                reference_category: "SECURITY",
                reference_type: "cpe23Type",
                reference_locator: cpe,
            });
        }
        Self {
            spdx_id: package.element.spdx_id(),
            name: &package.name,
            version_info: package.version.as_deref(),
            supplier: package.spdx_supplier(),
            download_location: package.download_location.as_deref().unwrap_or(NOASSERTION),
            files_analyzed: false,
            checksums: package.checksum.iter().map(SpdxChecksum::from).collect(),
            homepage: package.homepage.as_deref(),
            license_concluded: package.spdx_license(),
            license_declared: package.spdx_license(),
            license_comments: package.license_comment.as_deref(),
            copyright_text: NOASSERTION,
            summary: package.summary.as_deref(),
            comment: package.evidence.as_ref().map(|e| format!("Declared in {e}")),
            external_refs,
        }
    }
}

impl<'a> From<&'a FileEntryDoc> for SpdxFile<'a> {
    fn from(file: &'a FileEntryDoc) -> Self {
        Self {
            spdx_id: file.element.spdx_id(),
            file_name: &file.name,
            checksums: file.checksum.iter().map(SpdxChecksum::from).collect(),
            license_concluded: NOASSERTION,
            copyright_text: NOASSERTION,
        }
    }
}

impl<'a> From<&'a Checksum> for SpdxChecksum<'a> {
    fn from(checksum: &'a Checksum) -> Self {
        Self {
            algorithm: checksum.algorithm.spdx_name(),
            checksum_value: &checksum.value,
        }
    }
}
