//! FHIR Immunization model

use crate::common::{CodeableConcept, Identifier, Quantity, Reference};
use serde::{Deserialize, Serialize};

/// Immunization event information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Immunization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    /// completed | entered-in-error | not-done
    pub status: String,

    /// Reason not done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<CodeableConcept>,

    /// Vaccine product administered
    pub vaccine_code: CodeableConcept,

    /// Who was immunized
    pub patient: Reference,

    /// Vaccine administration date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time: Option<String>,

    /// Indicates context the data was recorded in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_source: Option<bool>,

    /// Vaccine manufacturer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<Reference>,

    /// Vaccine lot number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    /// Body site vaccine was administered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<CodeableConcept>,

    /// How vaccine entered body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<CodeableConcept>,

    /// Amount of vaccine administered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose_quantity: Option<Quantity>,
}
