//! Problem concern act → Condition (one per problem observation)

use super::{
    clinical_statement, fhir_concept, has_template, is_negated, related_observations,
    status_code, Location, MapContext,
};
use crate::datatypes::{
    codeable_concept, date_from_hl7, date_time_from_hl7, identifiers,
};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{CodeableConcept, Coding, Condition, Resource};

const CLINICAL_STATUS: &str = "http://terminology.hl7.org/CodeSystem/condition-clinical";
const VERIFICATION_STATUS: &str = "http://terminology.hl7.org/CodeSystem/condition-ver-status";
const CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/condition-category";

/// Problem Status observation
const STATUS_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.6";
const STATUS_CODE: &str = "33999-4";

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
    // Some producers put the problem observation directly in the entry
    if entry.child("act").is_none() {
        if let Some(observation) = entry.child("observation").and_then(CcdaNode::first) {
            let at = at.join("observation");
            return Ok(vec![condition(None, observation, &at, ctx)?.into()]);
        }
    }

    let concern = clinical_statement(entry, "act", at)?;
    let at = at.join("act");
    let observations = related_observations(concern);
    if observations.is_empty() {
        return Err(at.missing("entryRelationship/observation"));
    }

    observations
        .into_iter()
        .enumerate()
        .map(|(index, observation)| {
            let at = at.join(&format!("entryRelationship[{index}]/observation"));
            condition(Some(concern), observation, &at, ctx).map(Resource::from)
        })
        .collect()
}

fn condition(
    concern: Option<&CcdaNode>,
    observation: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Condition, MappingError> {
    if observation.as_element().is_none() {
        return Err(at.error("problem observation has no content"));
    }
    let effective = observation.child("effectiveTime");
    let bound = |name: &str| {
        effective
            .and_then(|t| t.child(name))
            .and_then(|b| b.attribute("value"))
            .and_then(date_time_from_hl7)
    };
    let onset = bound("low").or_else(|| {
        effective
            .and_then(|t| t.attribute("value"))
            .and_then(date_time_from_hl7)
    });
    let abatement = bound("high");

    let clinical_status = status_from_observation(observation)
        .or_else(|| abatement.as_ref().map(|_| "resolved"))
        .or_else(|| concern.and_then(status_code).and_then(concern_status))
        .map(|code| CodeableConcept::from_coding(Coding::new(CLINICAL_STATUS, code)));

    let verification_status = is_negated(observation)
        .then(|| fhir_concept(VERIFICATION_STATUS, "refuted", "Refuted"));

    let recorded_date = concern
        .and_then(|act| act.child("effectiveTime"))
        .and_then(|t| t.child("low").or(Some(t)))
        .and_then(|t| t.attribute("value"))
        .and_then(date_from_hl7);

    Ok(Condition {
        id: Some(ctx.next_id("Condition")),
        identifier: identifiers(observation, "id"),
        clinical_status,
        verification_status,
        category: vec![fhir_concept(CATEGORY, "problem-list-item", "Problem List Item")],
        code: problem_code(observation),
        body_site: Vec::new(),
        subject: ctx.subject(),
        onset_date_time: onset,
        abatement_date_time: abatement,
        recorded_date,
    })
}

/// The diagnosis is the observation `value`; `code` only names the kind of problem.
fn problem_code(observation: &CcdaNode) -> Option<CodeableConcept> {
    codeable_concept(observation.child("value"))
}

fn status_from_observation(observation: &CcdaNode) -> Option<&'static str> {
    related_observations(observation)
        .into_iter()
        .find(|obs| {
            has_template(obs, STATUS_OBSERVATION)
                || obs.child("code").and_then(|c| c.attribute("code")) == Some(STATUS_CODE)
        })
        .and_then(|obs| obs.child("value"))
        .and_then(|value| value.attribute("code"))
        .and_then(|code| match code {
            "55561003" => Some("active"),
            "73425007" => Some("inactive"),
            "413322009" => Some("resolved"),
            _ => None,
        })
}

fn concern_status(code: &str) -> Option<&'static str> {
    match code {
        "active" => Some("active"),
        "completed" => Some("resolved"),
        "suspended" | "aborted" => Some("inactive"),
        _ => None,
    }
}
