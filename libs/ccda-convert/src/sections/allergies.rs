//! Allergy concern act → AllergyIntolerance (one per allergy observation)

use super::{
    clinical_statement, has_template, is_negated, related_observations, status_code, Location,
    MapContext,
};
use crate::datatypes::{codeable_concept, codeable_concepts, date_from_hl7, effective_date_time, identifiers};
use crate::error::MappingError;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{
    AllergyIntolerance, AllergyIntoleranceReaction, CodeableConcept, Coding, Resource,
};

const CLINICAL_STATUS: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical";
const VERIFICATION_STATUS: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";

const STATUS_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.28";
const REACTION_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.9";
const SEVERITY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.8";
const CRITICALITY_OBSERVATION: &str = "2.16.840.1.113883.10.20.22.4.145";

pub(super) fn map_entry(
    entry: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<Vec<Resource>, MappingError> {
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
            allergy(concern, observation, &at, ctx).map(Resource::from)
        })
        .collect()
}

fn allergy(
    concern: &CcdaNode,
    observation: &CcdaNode,
    at: &Location,
    ctx: &mut MapContext,
) -> Result<AllergyIntolerance, MappingError> {
    if observation.as_element().is_none() {
        return Err(at.error("allergy observation has no content"));
    }

    let kind = observation
        .child("value")
        .and_then(|v| v.attribute("code"))
        .map(intolerance_kind)
        .unwrap_or_default();

    let clinical_status = status_from_observation(observation)
        .or_else(|| status_code(concern).and_then(concern_status))
        .map(|code| CodeableConcept::from_coding(Coding::new(CLINICAL_STATUS, code)));

    let verification_status = is_negated(observation).then(|| {
        CodeableConcept::from_coding(
            Coding::new(VERIFICATION_STATUS, "refuted").with_display("Refuted"),
        )
    });

    let recorded_date = concern
        .child("effectiveTime")
        .and_then(|t| t.child("low").or(Some(t)))
        .and_then(|t| t.attribute("value"))
        .and_then(date_from_hl7);

    Ok(AllergyIntolerance {
        id: Some(ctx.next_id("AllergyIntolerance")),
        identifier: identifiers(observation, "id"),
        clinical_status,
        verification_status,
        type_: kind.type_.map(str::to_string),
        category: kind.category.map(str::to_string).into_iter().collect(),
        criticality: criticality(observation).map(str::to_string),
        code: codeable_concept(observation.path("participant/participantRole/playingEntity/code")),
        patient: ctx.subject(),
        onset_date_time: effective_date_time(observation.child("effectiveTime")),
        recorded_date,
        reaction: reactions(observation),
    })
}

#[derive(Debug, Default, Clone, Copy)]
struct IntoleranceKind {
    type_: Option<&'static str>,
    category: Option<&'static str>,
}

/// Allergy and intolerance type value set (SNOMED CT)
fn intolerance_kind(code: &str) -> IntoleranceKind {
    let (type_, category) = match code {
        "416098002" => (Some("allergy"), Some("medication")),
        "59037007" => (Some("intolerance"), Some("medication")),
        "419511003" => (None, Some("medication")),
        "414285001" => (Some("allergy"), Some("food")),
        "235719002" => (Some("intolerance"), Some("food")),
        "418471000" => (None, Some("food")),
        "426232007" => (Some("allergy"), Some("environment")),
        "419199007" => (Some("allergy"), None),
        _ => (None, None),
    };
    IntoleranceKind { type_, category }
}

fn status_from_observation(observation: &CcdaNode) -> Option<&'static str> {
    related_observations(observation)
        .into_iter()
        .find(|obs| has_template(obs, STATUS_OBSERVATION))
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

fn criticality(observation: &CcdaNode) -> Option<&'static str> {
    related_observations(observation)
        .into_iter()
        .find(|obs| has_template(obs, CRITICALITY_OBSERVATION))
        .and_then(|obs| obs.child("value"))
        .and_then(|value| value.attribute("code"))
        .and_then(|code| match code {
            "CRITH" => Some("high"),
            "CRITL" => Some("low"),
            "CRITU" => Some("unable-to-assess"),
            _ => None,
        })
}

fn reactions(observation: &CcdaNode) -> Vec<AllergyIntoleranceReaction> {
    related_observations(observation)
        .into_iter()
        .filter(|obs| has_template(obs, REACTION_OBSERVATION))
        .filter_map(|reaction| {
            let manifestation = codeable_concepts(reaction, "value");
            if manifestation.is_empty() {
                return None;
            }
            Some(AllergyIntoleranceReaction {
                manifestation,
                severity: severity(reaction).map(str::to_string),
                onset: effective_date_time(reaction.child("effectiveTime")),
            })
        })
        .collect()
}

fn severity(reaction: &CcdaNode) -> Option<&'static str> {
    related_observations(reaction)
        .into_iter()
        .find(|obs| has_template(obs, SEVERITY_OBSERVATION))
        .and_then(|obs| obs.child("value"))
        .and_then(|value| value.attribute("code"))
        .and_then(|code| match code {
            "255604002" => Some("mild"),
            "6736007" => Some("moderate"),
            "24484000" => Some("severe"),
            _ => None,
        })
}
