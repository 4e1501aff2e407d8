//! Encounter activity → Encounter

use super::{clinical_statement, status_code, Location, MapContext};
use crate::datatypes::{codeable_concept, effective_date_time, identifiers, period};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{CodeableConcept, Coding, Encounter, Period, Resource};

const ACT_CODE: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let encounter = clinical_statement(entry, "encounter", at)?;

    let type_ = codeable_concept(encounter.child("code"));
    let class = type_
        .as_ref()
        .and_then(|concept| {
            concept
                .coding
                .iter()
                .find(|c| c.system.as_deref() == Some(ACT_CODE))
                .cloned()
        })
        .unwrap_or_else(|| Coding::new(ACT_CODE, "AMB").with_display("ambulatory"));

    let status = match status_code(encounter) {
        Some("active") => "in-progress",
        Some("cancelled" | "aborted") => "cancelled",
        _ => "finished",
    };

    let effective = encounter.child("effectiveTime");
    let period = period(effective).or_else(|| {
        effective_date_time(effective).map(|start| Period {
            start: Some(start),
            end: None,
        })
    });

    let resource = Encounter {
        id: Some(ctx.next_id("Encounter")),
        identifier: identifiers(encounter, "id"),
        status: status.to_string(),
        class,
        type_: type_.into_iter().collect(),
        subject: ctx.subject(),
        period,
        reason_code: reasons(encounter),
    };
    Ok(vec![resource.into()])
}

/// Encounter diagnoses and indications carry the reason in an observation `value`,
/// either directly or inside an act.
fn reasons(encounter: &CcdaNode) -> Vec<CodeableConcept> {
    let direct = encounter.find_all("entryRelationship/observation");
    let nested = encounter.find_all("entryRelationship/act/entryRelationship/observation");
    direct
        .into_iter()
        .chain(nested)
        .filter_map(|obs| codeable_concept(obs.child("value")))
        .collect()
}
