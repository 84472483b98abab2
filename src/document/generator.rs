//! Document generator state machine.

use super::ids::DocumentIdSource;
use super::model::{
    DocumentHeader, DocumentRelationship, ElementRef, FileEntryDoc, PackageEntry, SbomDocument,
};
use crate::error::{GenerateErrorKind, Result, SbomError};
use crate::model::{DependencyGraph, FileEntry, NodeRef, PackageNode, RelationshipKind};
use std::collections::HashSet;

/// Name used when a graph has no root to name the document after
pub const FALLBACK_DOCUMENT_NAME: &str = "sbom";

/// Generation progress.
///
/// Packages and files may only be added before the first relationship;
/// nothing may be added once the document is sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    HeaderEmitted,
    PackageEmitted,
    RelationshipsEmitted,
    Sealed,
}

/// Which optional package fields to emit
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Emit resolved licenses; when false every license is `NOASSERTION`
    pub include_license: bool,
    /// Emit package URLs
    pub include_purl: bool,
    /// Emit CPE identifiers
    pub include_cpe: bool,
    /// Creating tool name
    pub tool_name: String,
    /// Creating tool version
    pub tool_version: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            include_license: true,
            include_purl: true,
            include_cpe: false,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Accumulates packages, files and relationships into an [`SbomDocument`].
///
/// # Example
///
/// ```ignore
/// let mut generator = DocumentGenerator::new("alpha", "3.21", &RandomIds, GeneratorOptions::default());
/// let alpha = generator.add_package(&node)?;
/// generator.add_relationship(ElementRef::Document, alpha, RelationshipKind::Describes)?;
/// let document = generator.document();
/// ```
#[derive(Debug)]
pub struct DocumentGenerator {
    state: GeneratorState,
    options: GeneratorOptions,
    header: DocumentHeader,
    packages: Vec<PackageEntry>,
    files: Vec<FileEntryDoc>,
    elements: HashSet<ElementRef>,
    relationships: Vec<DocumentRelationship>,
    seen_relationships: HashSet<DocumentRelationship>,
    sealed: Option<SbomDocument>,
}

impl DocumentGenerator {
    /// Start a document; draws the instance id and timestamp once.
    pub fn new(
        name: &str,
        license_list_version: &str,
        ids: &dyn DocumentIdSource,
        options: GeneratorOptions,
    ) -> Self {
        let drawn = ids.draw();
        let header = DocumentHeader {
            name: name.trim().replace(' ', "-"),
            instance: drawn.instance,
            created: drawn.created,
            tool_name: options.tool_name.clone(),
            tool_version: options.tool_version.clone(),
            license_list_version: license_list_version.to_string(),
        };
        let mut elements = HashSet::new();
        elements.insert(ElementRef::Document);
        Self {
            state: GeneratorState::HeaderEmitted,
            options,
            header,
            packages: Vec::new(),
            files: Vec::new(),
            elements,
            relationships: Vec::new(),
            seen_relationships: HashSet::new(),
            sealed: None,
        }
    }

    /// Build a sealed document from a finished graph.
    ///
    /// Packages keep graph discovery order, so the n-th discovered package
    /// gets reference `<n>-<name>`.
    pub fn from_graph(
        graph: &DependencyGraph,
        license_list_version: &str,
        ids: &dyn DocumentIdSource,
        options: GeneratorOptions,
    ) -> Result<SbomDocument> {
        let name = graph.root().map_or(FALLBACK_DOCUMENT_NAME, PackageNode::name);
        let mut generator = Self::new(name, license_list_version, ids, options);

        let mut packages = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            packages.push(generator.add_package(node)?);
        }
        let mut files = Vec::with_capacity(graph.files().len());
        for file in graph.files() {
            files.push(generator.add_file(file)?);
        }

        let element = |node: NodeRef| -> Result<ElementRef> {
            let found = match node {
                NodeRef::Document => Some(ElementRef::Document),
                NodeRef::Package(index) => packages.get(index).cloned(),
                NodeRef::File(index) => files.get(index).cloned(),
            };
            found.ok_or_else(|| {
                SbomError::generate(
                    "mapping graph relationships",
                    GenerateErrorKind::UnknownElement(format!("{node:?}")),
                )
            })
        };
        for relationship in graph.relationships() {
            generator.add_relationship(
                element(relationship.from)?,
                element(relationship.to)?,
                relationship.kind,
            )?;
        }
        Ok(generator.into_document())
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Header of the document being generated
    #[must_use]
    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    /// Add a package and return its reference.
    pub fn add_package(&mut self, node: &PackageNode) -> Result<ElementRef> {
        self.check_open("packages")?;
        let element = ElementRef::package(self.packages.len() + 1, node.name());
        let GeneratorOptions {
            include_license,
            include_purl,
            include_cpe,
            ..
        } = self.options;
        let license = (include_license && node.license.is_valid_spdx)
            .then(|| node.license.resolved.clone());

        self.packages.push(PackageEntry {
            element: element.clone(),
            name: node.name().to_string(),
            version: node.version().map(String::from),
            role: node.role,
            supplier: node.supplier.clone(),
            declared_license: node.license.declared.clone(),
            license,
            license_included: include_license,
            license_comment: node.license.comment.clone().filter(|_| include_license),
            homepage: node.homepage.clone(),
            summary: node.summary.clone(),
            download_location: node.download_location.clone(),
            purl: node.purl.clone().filter(|_| include_purl),
            cpe: node.cpe.clone().filter(|_| include_cpe),
            checksum: node.checksum.clone(),
            evidence: node.evidence.clone(),
        });
        self.elements.insert(element.clone());
        self.state = GeneratorState::PackageEmitted;
        Ok(element)
    }

    /// Add a file and return its reference.
    pub fn add_file(&mut self, file: &FileEntry) -> Result<ElementRef> {
        self.check_open("files")?;
        let element = ElementRef::file(self.files.len() + 1, &file.name);
        self.files.push(FileEntryDoc {
            element: element.clone(),
            name: file.name.clone(),
            checksum: file.checksum.clone(),
        });
        self.elements.insert(element.clone());
        Ok(element)
    }

    /// Record a relationship between two known elements.
    ///
    /// Duplicates are ignored.
    pub fn add_relationship(&mut self, from: ElementRef, to: ElementRef, kind: RelationshipKind) -> Result<()> {
        if self.state == GeneratorState::Sealed {
            return Err(SbomError::generate("adding relationship", GenerateErrorKind::Sealed));
        }
        for element in [&from, &to] {
            if !self.elements.contains(element) {
                return Err(SbomError::generate(
                    "adding relationship",
                    GenerateErrorKind::UnknownElement(element.spdx_id()),
                ));
            }
        }
        let relationship = DocumentRelationship { from, to, kind };
        if self.seen_relationships.insert(relationship.clone()) {
            self.relationships.push(relationship);
        }
        self.state = GeneratorState::RelationshipsEmitted;
        Ok(())
    }

    /// Seal and return the document.
    ///
    /// The first call sorts the relationships; later calls return the
    /// same document unchanged.
    pub fn document(&mut self) -> &SbomDocument {
        let Self {
            state,
            header,
            packages,
            files,
            relationships,
            sealed,
            ..
        } = self;
        sealed.get_or_insert_with(|| {
            *state = GeneratorState::Sealed;
            seal(header, packages, files, relationships)
        })
    }

    /// Seal and take ownership of the document
    #[must_use]
    pub fn into_document(mut self) -> SbomDocument {
        match self.sealed.take() {
            Some(document) => document,
            None => seal(
                &self.header,
                &mut self.packages,
                &mut self.files,
                &mut self.relationships,
            ),
        }
    }

    fn check_open(&self, what: &'static str) -> Result<()> {
        match self.state {
            GeneratorState::Sealed => Err(SbomError::generate(
                format!("adding {what}"),
                GenerateErrorKind::Sealed,
            )),
            GeneratorState::RelationshipsEmitted => Err(SbomError::generate(
                format!("adding {what}"),
                GenerateErrorKind::OutOfOrder(what),
            )),
            GeneratorState::HeaderEmitted | GeneratorState::PackageEmitted => Ok(()),
        }
    }
}

fn seal(
    header: &DocumentHeader,
    packages: &mut Vec<PackageEntry>,
    files: &mut Vec<FileEntryDoc>,
    relationships: &mut Vec<DocumentRelationship>,
) -> SbomDocument {
    let mut relationships = std::mem::take(relationships);
    relationships.sort_by_cached_key(DocumentRelationship::sort_key);
    tracing::debug!(
        "Sealing document {} with {} packages and {} relationships",
        header.name,
        packages.len(),
        relationships.len()
    );
    SbomDocument {
        header: header.clone(),
        packages: std::mem::take(packages),
        files: std::mem::take(files),
        relationships,
    }
}
