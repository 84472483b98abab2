//! SPDX tag/value serializer.

use super::format::{Encoding, OutputFormat, SbomType};
use super::model::{
    DocumentHeader, FileEntryDoc, PackageEntry, SbomDocument, CREATOR_COMMENT, DATA_LICENSE,
    NOASSERTION, SPDX_VERSION,
};
use super::serializer::DocumentSerializer;
use crate::error::Result;
use crate::model::Checksum;

/// Writes `Tag: Value` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxTagSerializer;

impl DocumentSerializer for SpdxTagSerializer {
    fn serialize(&self, document: &SbomDocument) -> Result<String> {
        let mut out = TagWriter::default();
        write_header(&mut out, &document.header);
        for package in &document.packages {
            write_package(&mut out, package);
        }
        for file in &document.files {
            write_file(&mut out, file);
        }
        if !document.relationships.is_empty() {
            out.comment("");
        }
        for relationship in &document.relationships {
            out.tag(
                "Relationship",
                &format!(
                    "{} {} {}",
                    relationship.from.spdx_id(),
                    relationship.kind,
                    relationship.to.spdx_id()
                ),
            );
        }
        Ok(out.finish())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::new(SbomType::Spdx, Encoding::Tag)
    }
}

#[derive(Default)]
struct TagWriter {
    buf: String,
}

impl TagWriter {
    /// Single-line value; embedded line breaks would start a new tag.
    fn tag(&mut self, tag: &str, value: &str) {
        let value = value.replace(['\r', '\n'], " ");
        self.buf.push_str(&format!("{tag}: {}\n", value.trim()));
    }

    /// Free text wrapped in `<text>` so it may span lines.
    fn text(&mut self, tag: &str, value: &str) {
        let value = value.replace("</text>", "&lt;/text&gt;");
        self.buf.push_str(&format!("{tag}: <text>{}</text>\n", value.trim()));
    }

    fn comment(&mut self, comment: &str) {
        if comment.is_empty() {
            self.buf.push_str("#####\n\n");
        } else {
            self.buf.push_str(&format!("##### {comment}\n"));
        }
    }

    fn checksum(&mut self, tag: &str, checksum: &Checksum) {
        self.tag(tag, &format!("{}: {}", checksum.algorithm.spdx_name(), checksum.value));
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn write_header(out: &mut TagWriter, header: &DocumentHeader) {
    out.tag("SPDXVersion", SPDX_VERSION);
    out.tag("DataLicense", DATA_LICENSE);
    out.tag("SPDXID", &super::ElementRef::Document.spdx_id());
    out.tag("DocumentName", &header.name);
    out.tag("DocumentNamespace", &header.namespace());
    out.tag("LicenseListVersion", &header.license_list_version);
    out.tag("Creator", &header.creator());
    out.tag("Created", &header.created_timestamp());
    out.text("CreatorComment", CREATOR_COMMENT);
}

fn write_package(out: &mut TagWriter, package: &PackageEntry) {
    out.comment("");
    out.tag("PackageName", &package.name);
    out.tag("SPDXID", &package.element.spdx_id());
    if let Some(version) = &package.version {
        out.tag("PackageVersion", version);
    }
    out.tag("PackageSupplier", &package.spdx_supplier());
    out.tag(
        "PackageDownloadLocation",
        package.download_location.as_deref().unwrap_or(NOASSERTION),
    );
    out.tag("FilesAnalyzed", "false");
    if let Some(checksum) = &package.checksum {
        out.checksum("PackageChecksum", checksum);
    }
    if let Some(homepage) = &package.homepage {
        out.tag("PackageHomePage", homepage);
    }
    let reported = if package.declared_license.is_empty() {
        NOASSERTION
    } else {
        &package.declared_license
    };
    out.comment(&format!("Reported license {reported}"));
    out.tag("PackageLicenseConcluded", package.spdx_license());
    out.tag("PackageLicenseDeclared", package.spdx_license());
    if let Some(comment) = &package.license_comment {
        out.text("PackageLicenseComments", comment);
    }
    out.tag("PackageCopyrightText", NOASSERTION);
    if let Some(summary) = &package.summary {
        out.text("PackageSummary", summary);
    }
    if let Some(evidence) = &package.evidence {
        out.text("PackageComment", &format!("Declared in {evidence}"));
    }
    if let Some(purl) = &package.purl {
        out.tag("ExternalRef", &format!("PACKAGE-MANAGER purl {purl}"));
    }
    if let Some(cpe) = &package.cpe {
        out.tag("ExternalRef", &format!("SECURITY cpe23Type {cpe}"));
    }
}

fn write_file(out: &mut TagWriter, file: &FileEntryDoc) {
    out.comment("");
    out.tag("FileName", &file.name);
    out.tag("SPDXID", &file.element.spdx_id());
    if let Some(checksum) = &file.checksum {
        out.checksum("FileChecksum", checksum);
    }
    out.tag("LicenseConcluded", NOASSERTION);
    out.tag("CopyrightText", NOASSERTION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentGenerator, ElementRef, FixedIds, GeneratorOptions};
    use crate::model::{PackageId, PackageNode, PackageRole, RelationshipKind, Supplier, SupplierKind};

    fn document() -> SbomDocument {
        let mut node = PackageNode::new(PackageId::new("alpha", Some("1.0")), PackageRole::Application);
        node.license.declared = "MIT".to_string();
        node.license.resolved = "MIT".to_string();
        node.license.is_valid_spdx = true;
        node.supplier = Supplier {
            kind: SupplierKind::Person,
            name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
        };
        node.summary = Some("First line\nsecond line".to_string());
        node.purl = Some("pkg:pypi/alpha@1.0".to_string());

        let mut generator =
            DocumentGenerator::new("alpha", "3.21", &FixedIds::default(), GeneratorOptions::default());
        let alpha = generator.add_package(&node).expect("add");
        generator
            .add_relationship(ElementRef::Document, alpha, RelationshipKind::Describes)
            .expect("relate");
        generator.into_document()
    }

    #[test]
    fn test_tag_output_fields() {
        let out = SpdxTagSerializer.serialize(&document()).expect("serialize");
        assert!(out.starts_with("SPDXVersion: SPDX-2.3\nDataLicense: CC0-1.0\nSPDXID: SPDXRef-DOCUMENT\n"));
        assert!(out.contains("Creator: Tool: sbom-builder-"));
        assert!(out.contains("Created: 1970-01-01T00:00:00Z\n"));
        assert!(out.contains("PackageName: alpha\n"));
        assert!(out.contains("SPDXID: SPDXRef-Package-1-alpha\n"));
        assert!(out.contains("PackageSupplier: Person: Jane Doe (jane@example.com)\n"));
        assert!(out.contains("##### Reported license MIT\n"));
        assert!(out.contains("PackageLicenseDeclared: MIT\n"));
        assert!(out.contains("PackageSummary: <text>First line\nsecond line</text>\n"));
        assert!(out.contains("ExternalRef: PACKAGE-MANAGER purl pkg:pypi/alpha@1.0\n"));
        assert!(out.ends_with("Relationship: SPDXRef-DOCUMENT DESCRIBES SPDXRef-Package-1-alpha\n"));
    }

    #[test]
    fn test_single_line_values_flattened() {
        let mut out = TagWriter::default();
        out.tag("PackageHomePage", "https://a\nInjected: value");
        assert_eq!(out.finish(), "PackageHomePage: https://a Injected: value\n");
    }
}
