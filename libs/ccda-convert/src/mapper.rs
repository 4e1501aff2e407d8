//! Intermediate tree → typed FHIR resources

use crate::datatypes::instance_key;
use crate::error::{ConvertError, MappingError, Result};
use crate::header;
use crate::ids::{urn, IdGenerator};
use crate::options::ConvertOptions;
use crate::sections::{self, MapContext, SectionKind};
use cobalt_ccda_format::render_narrative;
use cobalt_ccda_model::{sanitize, CcdaNode, Element};
use cobalt_models::{Narrative, Reference, Resource};
use tracing::{debug, warn};

const ROOT: &str = "ClinicalDocument";

/// Where a mapped resource came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Patient, Practitioner or Composition
    Header,
    Section(SectionKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedResource {
    pub resource: Resource,
    pub origin: Origin,
}

/// Result of mapping one document: resources in production order plus the
/// sections that had to be skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappedDocument {
    /// `root^extension` of `ClinicalDocument/id`
    pub document_id: Option<String>,
    pub resources: Vec<MappedResource>,
    pub failures: Vec<MappingError>,
}

impl MappedDocument {
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().map(|m| &m.resource)
    }

    fn push(&mut self, origin: Origin, resource: impl Into<Resource>) {
        self.resources.push(MappedResource {
            resource: resource.into(),
            origin,
        });
    }

    fn record(&mut self, error: MappingError, fail_fast: bool) -> Result<()> {
        if fail_fast {
            return Err(error.into());
        }
        warn!(
            section = %error.section,
            path = %error.path,
            error = %error.reason,
            "Skipping section that could not be mapped"
        );
        self.failures.push(error);
        Ok(())
    }
}

/// Map a parsed C-CDA tree to FHIR resources.
///
/// Fails only when the tree is not a `ClinicalDocument` (or on the first
/// section failure with `fail_fast`). Every other problem skips the affected
/// section and is reported in [`MappedDocument::failures`].
pub fn map_to_fhir_resources(tree: &CcdaNode, options: &ConvertOptions) -> Result<MappedDocument> {
    options.validate()?;

    let raw = tree
        .child(ROOT)
        .ok_or_else(|| ConvertError::NotClinicalDocument(root_name(tree)))?;
    let document = sanitize(raw).unwrap_or_else(|| CcdaNode::from(Element::new()));

    let mut mapped = MappedDocument {
        document_id: instance_key(document.child("id")),
        ..Default::default()
    };

    let mut ids = IdGenerator::new(options.id_strategy, mapped.document_id.as_deref());
    let composition_id = options
        .include_composition
        .then(|| ids.next_id("Composition"));
    let patient_id = ids.next_id("Patient");
    let mut ctx = MapContext::new(ids, &patient_id);

    // Section resources always reference this id, so an unmappable header
    // still yields a Patient carrying nothing but the id.
    match header::patient(&document, patient_id.clone()) {
        Ok(patient) => mapped.push(Origin::Header, patient),
        Err(error) => {
            mapped.record(error, options.fail_fast)?;
            mapped.push(Origin::Header, header::placeholder_patient(patient_id));
        }
    }

    let mut authors = Vec::new();
    for author in header::author_people(&document) {
        let id = ctx.next_id("Practitioner");
        authors.push(Reference::to(urn(&id)));
        mapped.push(Origin::Header, header::practitioner(author, id));
    }

    let mut composition_sections = Vec::new();
    for section in document.find_all("component/structuredBody/component/section") {
        let mut summary = header::composition_section(section);
        if options.include_narrative {
            summary.text = narrative(section);
        }

        match SectionKind::detect(section) {
            None => debug!(title = ?summary.title, "Section not recognised, keeping narrative only"),
            Some(kind) => match sections::map_section(kind, section, &mut ctx) {
                Ok(resources) => {
                    debug!(section = kind.name(), count = resources.len(), "Mapped section");
                    summary.entry = resources
                        .iter()
                        .filter_map(Resource::urn)
                        .map(Reference::to)
                        .collect();
                    for resource in resources {
                        mapped.push(Origin::Section(kind), resource);
                    }
                }
                Err(error) => mapped.record(error, options.fail_fast)?,
            },
        }
        composition_sections.push(summary);
    }

    if let Some(id) = composition_id {
        match header::composition(&document, id, ctx.subject(), authors) {
            Ok(mut composition) => {
                composition.section = composition_sections;
                mapped.resources.insert(
                    0,
                    MappedResource {
                        resource: composition.into(),
                        origin: Origin::Header,
                    },
                );
            }
            Err(error) => mapped.record(error, options.fail_fast)?,
        }
    }

    Ok(mapped)
}

fn root_name(tree: &CcdaNode) -> String {
    tree.as_element()
        .and_then(|root| root.child_entries().next())
        .map(|(name, _)| name.to_string())
        .unwrap_or_default()
}

/// Section narrative as XHTML. Markup that cannot be rendered is left out.
fn narrative(section: &CcdaNode) -> Option<Narrative> {
    let markup = section.child("text")?.as_str()?.trim();
    if markup.is_empty() {
        return None;
    }
    match render_narrative(markup) {
        Ok(div) => Some(Narrative {
            status: "generated".to_string(),
            div,
        }),
        Err(error) => {
            warn!(%error, "Dropping section narrative that is not well-formed");
            None
        }
    }
}
