//! Result and vital sign observations → Observation

use super::{status_code, Location, MapContext};
use crate::datatypes::{codeable_concept, codeable_concepts, effective_date_time, identifiers, quantity, text};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{CodeableConcept, Coding, Observation, ObservationReferenceRange, Range};

const CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/observation-category";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Category {
    VitalSigns,
    Laboratory,
}

impl Category {
    fn concept(self) -> CodeableConcept {
        let (code, display) = match self {
            Category::VitalSigns => ("vital-signs", "Vital Signs"),
            Category::Laboratory => ("laboratory", "Laboratory"),
        };
        CodeableConcept::from_coding(Coding::new(CATEGORY, code).with_display(display))
    }
}

/// Map one `observation` with an already allocated id.
pub(super) fn map_observation(
    id: String,
    observation: &CcdaNode,
    category: Category,
    at: &Location,
    ctx: &MapContext,
) -> Result<Observation, MappingError> {
    let code = codeable_concept(observation.child("code")).ok_or_else(|| at.missing("code"))?;

    let mut mapped = Observation {
        id: Some(id),
        identifier: identifiers(observation, "id"),
        status: observation_status(status_code(observation)).to_string(),
        category: vec![category.concept()],
        code,
        subject: ctx.subject(),
        effective_date_time: effective_date_time(observation.child("effectiveTime")),
        interpretation: codeable_concepts(observation, "interpretationCode"),
        reference_range: reference_ranges(observation),
        ..Default::default()
    };

    if let Some(value) = observation.child("value").and_then(CcdaNode::first) {
        match value.attribute("xsi:type") {
            Some("PQ" | "INT" | "REAL") => mapped.value_quantity = quantity(Some(value)),
            Some("IVL_PQ") => match range(value) {
                Some(range) => mapped.value_range = Some(range),
                None => mapped.value_quantity = quantity(Some(value)),
            },
            Some("CD" | "CE" | "CV" | "CO") => {
                mapped.value_codeable_concept = codeable_concept(Some(value))
            }
            Some("ST" | "ED") => mapped.value_string = text(Some(value)),
            _ => {
                mapped.value_quantity = quantity(Some(value));
                if mapped.value_quantity.is_none() {
                    mapped.value_codeable_concept = codeable_concept(Some(value));
                }
                if mapped.value_quantity.is_none() && mapped.value_codeable_concept.is_none() {
                    mapped.value_string = text(Some(value));
                }
            }
        }
    }

    Ok(mapped)
}

pub(super) fn observation_status(code: Option<&str>) -> &'static str {
    match code {
        Some("completed") | None => "final",
        Some("active") => "preliminary",
        Some("aborted" | "cancelled") => "cancelled",
        Some("nullified") => "entered-in-error",
        Some(_) => "unknown",
    }
}

/// `low`/`high` bounds of an `IVL_PQ`.
fn range(value: &CcdaNode) -> Option<Range> {
    let low = quantity(value.child("low"));
    let high = quantity(value.child("high"));
    (low.is_some() || high.is_some()).then_some(Range { low, high })
}

fn reference_ranges(observation: &CcdaNode) -> Vec<ObservationReferenceRange> {
    observation
        .find_all("referenceRange/observationRange")
        .into_iter()
        .filter_map(|range| {
            let value = range.child("value");
            let mapped = ObservationReferenceRange {
                low: quantity(value.and_then(|v| v.child("low"))),
                high: quantity(value.and_then(|v| v.child("high"))),
                text: text(range.child("text")),
            };
            let empty = mapped.low.is_none() && mapped.high.is_none() && mapped.text.is_none();
            (!empty).then_some(mapped)
        })
        .collect()
}
