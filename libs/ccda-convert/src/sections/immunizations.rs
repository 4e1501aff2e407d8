//! Immunization activity → Immunization

use super::{clinical_statement, is_negated, related_observations, status_code, Location, MapContext};
use crate::datatypes::{codeable_concept, effective_date_time, identifiers, quantity, text};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{Immunization, Reference, Resource};

const MATERIAL: &str = "consumable/manufacturedProduct/manufacturedMaterial";

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let activity = clinical_statement(entry, "substanceAdministration", at)?;
    let at = at.join("substanceAdministration");

    let material = activity.path(MATERIAL);
    let vaccine_code = codeable_concept(material.and_then(|m| m.child("code")))
        .ok_or_else(|| at.missing(&format!("{MATERIAL}/code")))?;

    let negated = is_negated(activity);
    let status = match (negated, status_code(activity)) {
        (_, Some("nullified")) => "entered-in-error",
        (true, _) => "not-done",
        _ => "completed",
    };
    // Refusal reason is the nested observation of a declined immunization
    let status_reason = negated
        .then(|| related_observations(activity).into_iter().next())
        .flatten()
        .and_then(|obs| codeable_concept(obs.child("code")));

    let manufacturer = text(activity.path("consumable/manufacturedProduct/manufacturerOrganization/name"))
        .map(Reference::display);

    let immunization = Immunization {
        id: Some(ctx.next_id("Immunization")),
        identifier: identifiers(activity, "id"),
        status: status.to_string(),
        status_reason,
        vaccine_code,
        patient: ctx.subject(),
        occurrence_date_time: effective_date_time(activity.child("effectiveTime")),
        primary_source: None,
        manufacturer,
        lot_number: text(material.and_then(|m| m.child("lotNumberText"))),
        site: codeable_concept(activity.child("approachSiteCode")),
        route: codeable_concept(activity.child("routeCode")),
        dose_quantity: quantity(activity.child("doseQuantity")),
    };
    Ok(vec![immunization.into()])
}
