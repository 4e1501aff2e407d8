//! FHIR MedicationStatement model

use crate::common::{CodeableConcept, Dosage, Identifier, Period, Reference};
use serde::{Deserialize, Serialize};

/// Record of medication being taken by a patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    /// active | completed | entered-in-error | intended | stopped | on-hold | unknown | not-taken
    pub status: String,

    /// What medication was taken
    pub medication_codeable_concept: CodeableConcept,

    /// Who is/was taking the medication
    pub subject: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_period: Option<Period>,

    /// Details of how medication is/was taken or should be taken
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dosage: Vec<Dosage>,
}
