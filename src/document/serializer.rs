//! Serializer selection.

use super::cyclonedx_json::CycloneDxJsonSerializer;
use super::cyclonedx_xml::CycloneDxXmlSerializer;
use super::format::{Encoding, OutputFormat, SbomType};
use super::model::SbomDocument;
use super::spdx_json::{SpdxJsonSerializer, SpdxYamlSerializer};
use super::spdx_tag::SpdxTagSerializer;
use crate::error::Result;

/// Encodes a sealed document in one schema and encoding.
pub trait DocumentSerializer: Send + Sync {
    /// Render the document
    fn serialize(&self, document: &SbomDocument) -> Result<String>;

    /// The format this serializer produces
    fn format(&self) -> OutputFormat;
}

/// Pick the serializer for a format, correcting unsupported combinations first.
#[must_use]
pub fn serializer_for(format: OutputFormat) -> Box<dyn DocumentSerializer> {
    let format = format.corrected();
    match (format.sbom, format.encoding) {
        (SbomType::Spdx, Encoding::Json) => Box::new(SpdxJsonSerializer),
        (SbomType::Spdx, Encoding::Yaml) => Box::new(SpdxYamlSerializer),
        (SbomType::Spdx, _) => Box::new(SpdxTagSerializer),
        (SbomType::CycloneDx, Encoding::Xml) => Box::new(CycloneDxXmlSerializer),
        (SbomType::CycloneDx, _) => Box::new(CycloneDxJsonSerializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializer_for_matches_corrected_format() {
        for sbom in [SbomType::Spdx, SbomType::CycloneDx] {
            for encoding in [Encoding::Tag, Encoding::Json, Encoding::Xml, Encoding::Yaml] {
                let requested = OutputFormat::new(sbom, encoding);
                assert_eq!(serializer_for(requested).format(), requested.corrected());
            }
        }
    }
}
