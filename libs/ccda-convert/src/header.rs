//! Document header → Patient, Practitioner and Composition

use crate::datatypes::{
    addresses, codeable_concept, contact_points, date_from_hl7, date_time_from_hl7,
    human_names, identifier, identifiers, text,
};
use crate::error::MappingError;
use crate::sections::Location;
use crate::systems::system_uri;
use cobalt_ccda_model::CcdaNode;
use cobalt_models::{
    CodeableConcept, Coding, Composition, CompositionSection, Extension, Patient,
    PatientCommunication, Practitioner, Reference,
};

const US_CORE_RACE: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race";
const US_CORE_ETHNICITY: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-ethnicity";
const LANGUAGE: &str = "urn:ietf:bcp:47";

/// Patient from `recordTarget/patientRole` of a sanitized header.
pub(crate) fn patient(document: &CcdaNode, id: String) -> Result<Patient, MappingError> {
    let at = Location::new("patient", "recordTarget");
    let role = document
        .path("recordTarget/patientRole")
        .filter(|role| role.as_element().is_some())
        .ok_or_else(|| at.missing("patientRole"))?;
    let person = role.child("patient").and_then(CcdaNode::first);

    let mut patient = Patient {
        id: Some(id),
        identifier: identifiers(role, "id"),
        telecom: contact_points(role, "telecom"),
        address: addresses(role, "addr"),
        ..Default::default()
    };
    let Some(person) = person else {
        return Ok(patient);
    };

    patient.name = human_names(person, "name");
    patient.gender = person
        .child("administrativeGenderCode")
        .and_then(|g| g.attribute("code"))
        .and_then(gender)
        .map(str::to_string);
    patient.birth_date = person
        .child("birthTime")
        .and_then(|t| t.attribute("value"))
        .and_then(date_from_hl7);
    patient.marital_status = codeable_concept(person.child("maritalStatusCode"));

    let deceased_time = person
        .child("sdtc:deceasedTime")
        .and_then(|t| t.attribute("value"))
        .and_then(date_time_from_hl7);
    match deceased_time {
        Some(time) => patient.deceased_date_time = Some(time),
        None => {
            patient.deceased_boolean = person
                .child("sdtc:deceasedInd")
                .and_then(|d| d.attribute("value"))
                .and_then(|v| v.parse::<bool>().ok());
        }
    }

    patient.communication = person
        .find_all("languageCommunication")
        .into_iter()
        .filter_map(|lc| {
            let code = lc.child("languageCode")?.attribute("code")?;
            Some(PatientCommunication {
                language: CodeableConcept::from_coding(Coding::new(LANGUAGE, code)),
                preferred: lc
                    .child("preferenceInd")
                    .and_then(|p| p.attribute("value"))
                    .and_then(|v| v.parse::<bool>().ok()),
            })
        })
        .collect();

    patient.extension = [
        omb_extension(US_CORE_RACE, person, "raceCode", "sdtc:raceCode"),
        omb_extension(US_CORE_ETHNICITY, person, "ethnicGroupCode", "sdtc:ethnicGroupCode"),
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(patient)
}

fn gender(code: &str) -> Option<&'static str> {
    match code {
        "M" => Some("male"),
        "F" => Some("female"),
        "UN" => Some("other"),
        _ => None,
    }
}

/// US Core race/ethnicity: the main code is the OMB category, `sdtc`
/// repetitions are detailed codes.
fn omb_extension(url: &str, person: &CcdaNode, main: &str, detailed: &str) -> Option<Extension> {
    let category = omb_codings(person, main);
    let details = omb_codings(person, detailed);
    if category.is_empty() && details.is_empty() {
        return None;
    }

    let text = category
        .iter()
        .chain(&details)
        .map(|c| c.display.as_deref().or(c.code.as_deref()).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ");

    let mut extension: Vec<Extension> = category
        .into_iter()
        .map(|coding| sub_extension("ombCategory", coding))
        .chain(details.into_iter().map(|coding| sub_extension("detailed", coding)))
        .collect();
    extension.push(Extension {
        url: "text".to_string(),
        value_string: Some(text),
        ..Default::default()
    });

    Some(Extension {
        url: url.to_string(),
        extension,
        ..Default::default()
    })
}

fn omb_codings(person: &CcdaNode, name: &str) -> Vec<Coding> {
    person
        .find_all(name)
        .into_iter()
        .filter_map(|node| {
            let code = node.attribute("code")?;
            Some(Coding {
                system: Some(
                    node.attribute("codeSystem")
                        .map(system_uri)
                        .unwrap_or_else(|| system_uri("2.16.840.1.113883.6.238")),
                ),
                code: Some(code.to_string()),
                display: node.attribute("displayName").map(str::to_string),
                ..Default::default()
            })
        })
        .collect()
}

fn sub_extension(url: &str, coding: Coding) -> Extension {
    Extension {
        url: url.to_string(),
        value_coding: Some(coding),
        ..Default::default()
    }
}

/// Patient standing in for a `recordTarget` that could not be mapped.
pub(crate) fn placeholder_patient(id: String) -> Patient {
    Patient {
        id: Some(id),
        ..Default::default()
    }
}

/// Authors that are people. Devices and organizations are skipped.
pub(crate) fn author_people(document: &CcdaNode) -> Vec<&CcdaNode> {
    document
        .find_all("author/assignedAuthor")
        .into_iter()
        .filter(|author| author.child("assignedPerson").is_some())
        .collect()
}

pub(crate) fn practitioner(author: &CcdaNode, id: String) -> Practitioner {
    Practitioner {
        id: Some(id),
        identifier: identifiers(author, "id"),
        name: author
            .child("assignedPerson")
            .map(|person| human_names(person, "name"))
            .unwrap_or_default(),
        telecom: contact_points(author, "telecom"),
        address: addresses(author, "addr"),
    }
}

/// Composition for the document header. Sections are filled in by the caller.
pub(crate) fn composition(
    document: &CcdaNode,
    id: String,
    subject: Reference,
    author: Vec<Reference>,
) -> Result<Composition, MappingError> {
    let at = Location::new("composition", "ClinicalDocument");
    let type_ = codeable_concept(document.child("code")).ok_or_else(|| at.missing("code"))?;

    let title = text(document.child("title"))
        .or_else(|| type_.coding.iter().find_map(|c| c.display.clone()))
        .or_else(|| type_.text.clone())
        .unwrap_or_else(|| "Clinical document".to_string());

    Ok(Composition {
        id: Some(id),
        identifier: document
            .child("id")
            .and_then(CcdaNode::first)
            .and_then(CcdaNode::as_element)
            .and_then(identifier),
        status: "final".to_string(),
        type_,
        subject: Some(subject),
        date: document
            .child("effectiveTime")
            .and_then(|t| t.attribute("value"))
            .and_then(date_time_from_hl7),
        author,
        title,
        confidentiality: document
            .child("confidentialityCode")
            .and_then(|c| c.attribute("code"))
            .map(str::to_string),
        section: Vec::new(),
    })
}

/// Composition section skeleton (title and code) for a C-CDA `section`.
pub(crate) fn composition_section(section: &CcdaNode) -> CompositionSection {
    CompositionSection {
        title: text(section.child("title")),
        code: codeable_concept(section.child("code")),
        text: None,
        entry: Vec::new(),
    }
}
