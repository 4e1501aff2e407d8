//! Section registry and per-section entry mappers
//!
//! A section is recognised by its `templateId/@root` (with or without the
//! "entries required" suffix), falling back to its LOINC section code. Each
//! kind maps its `entry` children independently of every other section.

mod allergies;
mod encounters;
mod immunizations;
mod medications;
mod observation;
mod problems;
mod procedures;
mod results;
mod vital_signs;

use crate::error::MappingError;
use crate::ids::{urn, IdGenerator};
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{CodeableConcept, Coding, Reference, Resource};
use std::fmt;

/// The clinical sections this crate knows how to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Allergies,
    Medications,
    Problems,
    Immunizations,
    VitalSigns,
    Results,
    Procedures,
    Encounters,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Allergies,
        SectionKind::Medications,
        SectionKind::Problems,
        SectionKind::Immunizations,
        SectionKind::VitalSigns,
        SectionKind::Results,
        SectionKind::Procedures,
        SectionKind::Encounters,
    ];

    /// Short name used in errors and logs
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Allergies => "allergies",
            SectionKind::Medications => "medications",
            SectionKind::Problems => "problems",
            SectionKind::Immunizations => "immunizations",
            SectionKind::VitalSigns => "vital-signs",
            SectionKind::Results => "results",
            SectionKind::Procedures => "procedures",
            SectionKind::Encounters => "encounters",
        }
    }

    /// LOINC section code
    pub fn loinc(self) -> &'static str {
        match self {
            SectionKind::Allergies => "48765-2",
            SectionKind::Medications => "10160-0",
            SectionKind::Problems => "11450-4",
            SectionKind::Immunizations => "11369-6",
            SectionKind::VitalSigns => "8716-3",
            SectionKind::Results => "30954-2",
            SectionKind::Procedures => "47519-4",
            SectionKind::Encounters => "46240-8",
        }
    }

    /// Section templateId roots, entries optional first
    pub fn template_roots(self) -> &'static [&'static str] {
        match self {
            SectionKind::Allergies => &["2.16.840.1.113883.10.20.22.2.6", "2.16.840.1.113883.10.20.22.2.6.1"],
            SectionKind::Medications => &["2.16.840.1.113883.10.20.22.2.1", "2.16.840.1.113883.10.20.22.2.1.1"],
            SectionKind::Problems => &["2.16.840.1.113883.10.20.22.2.5", "2.16.840.1.113883.10.20.22.2.5.1"],
            SectionKind::Immunizations => &["2.16.840.1.113883.10.20.22.2.2", "2.16.840.1.113883.10.20.22.2.2.1"],
            SectionKind::VitalSigns => &["2.16.840.1.113883.10.20.22.2.4", "2.16.840.1.113883.10.20.22.2.4.1"],
            SectionKind::Results => &["2.16.840.1.113883.10.20.22.2.3", "2.16.840.1.113883.10.20.22.2.3.1"],
            SectionKind::Procedures => &["2.16.840.1.113883.10.20.22.2.7", "2.16.840.1.113883.10.20.22.2.7.1"],
            SectionKind::Encounters => &["2.16.840.1.113883.10.20.22.2.22", "2.16.840.1.113883.10.20.22.2.22.1"],
        }
    }

    /// Identify a `section` node.
    pub fn detect(section: &CcdaNode) -> Option<Self> {
        let by_template = section
            .find_all("templateId")
            .into_iter()
            .filter_map(|t| t.attribute("root"))
            .find_map(|root| {
                Self::ALL
                    .into_iter()
                    .find(|kind| kind.template_roots().iter().any(|t| *t == root))
            });

        by_template.or_else(|| {
            let code = section.child("code")?.attribute("code")?;
            Self::ALL.into_iter().find(|kind| kind.loinc() == code)
        })
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a mapper is in the source document, for error reporting.
#[derive(Debug, Clone)]
pub(crate) struct Location {
    section: &'static str,
    path: String,
}

impl Location {
    pub fn new(section: &'static str, path: impl Into<String>) -> Self {
        Self {
            section,
            path: path.into(),
        }
    }

    pub fn join(&self, segment: &str) -> Self {
        Self {
            section: self.section,
            path: format!("{}/{segment}", self.path),
        }
    }

    pub fn error(&self, reason: impl Into<String>) -> MappingError {
        MappingError::new(self.section, self.path.clone(), reason)
    }

    /// Error for a required element that is absent once null flavors are gone.
    pub fn missing(&self, what: &str) -> MappingError {
        self.join(what).error(format!("missing required {what}"))
    }
}

/// State shared by every mapper of one document.
pub(crate) struct MapContext {
    pub ids: IdGenerator,
    pub patient: Reference,
}

impl MapContext {
    pub fn new(ids: IdGenerator, patient_id: &str) -> Self {
        Self {
            ids,
            patient: Reference::to(urn(patient_id)),
        }
    }

    /// Reference to the document's patient.
    pub fn subject(&self) -> Reference {
        self.patient.clone()
    }

    pub fn next_id(&mut self, resource_type: &str) -> String {
        self.ids.next_id(resource_type)
    }
}

/// Map every entry of a sanitized section.
///
/// The first failing entry fails the whole section.
pub(crate) fn map_section(
    kind: SectionKind,
    section: &CcdaNode,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let mut resources = Vec::new();
    for (index, entry) in section.find_all("entry").into_iter().enumerate() {
        let at = Location::new(kind.name(), format!("entry[{index}]"));
        let mapped = match kind {
            SectionKind::Allergies => allergies::map_entry(entry, &at, ctx)?,
            SectionKind::Medications => medications::map_entry(entry, &at, ctx)?,
            SectionKind::Problems => problems::map_entry(entry, &at, ctx)?,
            SectionKind::Immunizations => immunizations::map_entry(entry, &at, ctx)?,
            SectionKind::VitalSigns => vital_signs::map_entry(entry, &at, ctx)?,
            SectionKind::Results => results::map_entry(entry, &at, ctx)?,
            SectionKind::Procedures => procedures::map_entry(entry, &at, ctx)?,
            SectionKind::Encounters => encounters::map_entry(entry, &at, ctx)?,
        };
        resources.extend(mapped);
    }
    Ok(resources)
}

/// `true` when `node` declares the template `root`.
pub(crate) fn has_template(node: &CcdaNode, root: &str) -> bool {
    node.find_all("templateId")
        .into_iter()
        .any(|t| t.attribute("root") == Some(root))
}

/// Observations nested under `entryRelationship`, in document order.
pub(crate) fn related_observations(node: &CcdaNode) -> Vec<&CcdaNode> {
    node.find_all("entryRelationship/observation")
}

/// The `statusCode/@code` of a clinical statement.
pub(crate) fn status_code(node: &CcdaNode) -> Option<&str> {
    node.child("statusCode")?.attribute("code")
}

pub(crate) fn is_negated(node: &CcdaNode) -> bool {
    node.attribute("negationInd") == Some("true")
}

/// A single-coding concept from a FHIR-defined code system.
pub(crate) fn fhir_concept(system: &str, code: &str, display: &str) -> CodeableConcept {
    CodeableConcept::from_coding(Coding::new(system, code).with_display(display))
}

/// Element `name` of an entry, or the error for its absence.
pub(crate) fn clinical_statement<'a>(
    entry: &'a CcdaNode,
    name: &str,
    at: &Location,
) -> Result<&'a CcdaNode, MappingError> {
    entry
        .child(name)
        .and_then(CcdaNode::first)
        .filter(|node| node.as_element().is_some())
        .ok_or_else(|| at.missing(name))
}
