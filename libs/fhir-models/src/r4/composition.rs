//! FHIR Composition model

use crate::common::{CodeableConcept, Identifier, Narrative, Reference};
use serde::{Deserialize, Serialize};

/// A set of resources composed into a single coherent clinical statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Version-independent identifier for the Composition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    /// preliminary | final | amended | entered-in-error
    pub status: String,

    /// Kind of composition (LOINC if possible)
    #[serde(rename = "type")]
    pub type_: CodeableConcept,

    /// Who and/or what the composition is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    /// Composition editing time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Who and/or what authored the composition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Reference>,

    /// Human Readable name/title
    pub title: String,

    /// As defined by affinity domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidentiality: Option<String>,

    /// Composition is broken into sections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<CompositionSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSection {
    /// Label for section (e.g. for ToC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Classification of section (recommended)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    /// Text summary of the section, for human interpretation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    /// A reference to data that supports this section
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<Reference>,
}
