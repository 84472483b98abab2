//! SBOM document generation.
//!
//! A finished [`DependencyGraph`](crate::model::DependencyGraph) is turned
//! into an encoding-independent [`SbomDocument`] by the [`DocumentGenerator`],
//! then rendered by exactly one [`DocumentSerializer`]:
//!
//! | Schema | Encodings |
//! |---|---|
//! | SPDX 2.3 | tag/value, JSON, YAML |
//! | CycloneDX 1.4 | JSON, XML |
//!
//! Unsupported combinations are corrected by [`OutputFormat::corrected`]
//! before a serializer is chosen.

mod cyclonedx_json;
mod cyclonedx_xml;
mod format;
mod generator;
mod ids;
mod model;
mod serializer;
mod spdx_json;
mod spdx_tag;

pub use cyclonedx_json::CycloneDxJsonSerializer;
pub use cyclonedx_xml::CycloneDxXmlSerializer;
pub use format::{Encoding, OutputFormat, SbomType};
pub use generator::{DocumentGenerator, GeneratorOptions, GeneratorState, FALLBACK_DOCUMENT_NAME};
pub use ids::{DocumentIdSource, DocumentIds, FixedIds, RandomIds};
pub use model::{
    DocumentHeader, DocumentRelationship, ElementRef, FileEntryDoc, PackageEntry, SbomDocument,
    CYCLONEDX_SPEC_VERSION, DATA_LICENSE, NOASSERTION, SPDX_VERSION,
};
pub use serializer::{serializer_for, DocumentSerializer};
pub use spdx_json::{SpdxJsonSerializer, SpdxYamlSerializer};
pub use spdx_tag::SpdxTagSerializer;
