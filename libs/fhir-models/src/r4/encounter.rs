//! FHIR Encounter model

use crate::common::{CodeableConcept, Coding, Identifier, Period, Reference};
use serde::{Deserialize, Serialize};

/// An interaction during which services are provided to the patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    /// planned | arrived | triaged | in-progress | onleave | finished | cancelled +
    pub status: String,

    /// Classification of patient encounter
    pub class: Coding,

    /// Specific type of encounter
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub type_: Vec<CodeableConcept>,

    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    /// Coded reason the encounter takes place
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reason_code: Vec<CodeableConcept>,
}
