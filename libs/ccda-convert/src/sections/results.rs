//! Result organizer → DiagnosticReport plus its Observations

use super::observation::{map_observation, observation_status, Category};
use super::{clinical_statement, status_code, Location, MapContext};
use crate::datatypes::{codeable_concept, effective_date_time, identifiers};
use crate::error::MappingError;
use crate::ids::urn;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{CodeableConcept, Coding, DiagnosticReport, Reference, Resource};

const DIAGNOSTIC_SERVICE: &str = "http://terminology.hl7.org/CodeSystem/v2-0074";

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    let organizer = clinical_statement(entry, "organizer", at)?;
    let at = at.join("organizer");

    let code = codeable_concept(organizer.child("code")).ok_or_else(|| at.missing("code"))?;
    let report_id = ctx.next_id("DiagnosticReport");

    let mut observations = Vec::new();
    for (index, observation) in organizer.find_all("component/observation").into_iter().enumerate() {
        let at = at.join(&format!("component[{index}]/observation"));
        let id = ctx.next_id("Observation");
        observations.push(map_observation(id, observation, Category::Laboratory, &at, ctx)?);
    }

    let status = match status_code(organizer) {
        Some("active") => "partial",
        other => observation_status(other),
    };

    let report = DiagnosticReport {
        id: Some(report_id),
        identifier: identifiers(organizer, "id"),
        status: status.to_string(),
        category: vec![CodeableConcept::from_coding(
            Coding::new(DIAGNOSTIC_SERVICE, "LAB").with_display("Laboratory"),
        )],
        code,
        subject: ctx.subject(),
        effective_date_time: effective_date_time(organizer.child("effectiveTime")),
        result: observations
            .iter()
            .filter_map(|o| o.id.as_deref())
            .map(|id| Reference::to(urn(id)))
            .collect(),
    };

    let mut resources = vec![Resource::from(report)];
    resources.extend(observations.into_iter().map(Resource::from));
    Ok(resources)
}
