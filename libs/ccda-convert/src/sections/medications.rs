//! Medication activity → MedicationStatement

use super::{clinical_statement, is_negated, status_code, Location, MapContext};
use crate::datatypes::{codeable_concept, effective_date_time, identifiers, period, quantity, text};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{Dosage, DosageDoseAndRate, MedicationStatement, Resource};

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let activity = clinical_statement(entry, "substanceAdministration", at)?;
    let at = at.join("substanceAdministration");

    let medication = codeable_concept(
        activity.path("consumable/manufacturedProduct/manufacturedMaterial/code"),
    )
    .ok_or_else(|| at.missing("consumable/manufacturedProduct/manufacturedMaterial/code"))?;

    let status = if is_negated(activity) {
        "not-taken"
    } else {
        match status_code(activity) {
            Some("active") => "active",
            Some("completed") => "completed",
            Some("aborted" | "cancelled") => "stopped",
            Some("suspended" | "held") => "on-hold",
            Some("nullified") => "entered-in-error",
            _ => "unknown",
        }
    };

    // effectiveTime repeats: an IVL_TS for the duration, then a PIVL_TS for frequency
    let effective = activity.find_all("effectiveTime");
    let effective_period = effective.iter().find_map(|t| period(Some(t)));
    let effective_date_time = match effective_period {
        Some(_) => None,
        None => effective
            .iter()
            .find_map(|t| effective_date_time(Some(t))),
    };

    let dose = quantity(activity.child("doseQuantity"));
    let dosage = Dosage {
        text: text(activity.child("text")),
        route: codeable_concept(activity.child("routeCode")),
        dose_and_rate: dose
            .map(|q| DosageDoseAndRate { dose_quantity: Some(q) })
            .into_iter()
            .collect(),
    };

    let statement = MedicationStatement {
        id: Some(ctx.next_id("MedicationStatement")),
        identifier: identifiers(activity, "id"),
        status: status.to_string(),
        medication_codeable_concept: medication,
        subject: ctx.subject(),
        effective_date_time,
        effective_period,
        dosage: if dosage.is_empty() { Vec::new() } else { vec![dosage] },
    };
    Ok(vec![statement.into()])
}
