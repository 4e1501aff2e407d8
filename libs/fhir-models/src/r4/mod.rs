//! Clinical resources shaped after FHIR R4
//!
//! Only the elements a C-CDA document can populate are modelled.

pub mod allergy_intolerance;
pub mod composition;
pub mod condition;
pub mod diagnostic_report;
pub mod encounter;
pub mod immunization;
pub mod medication_statement;
pub mod observation;
pub mod patient;
pub mod practitioner;
pub mod procedure;

pub use allergy_intolerance::*;
pub use composition::*;
pub use condition::*;
pub use diagnostic_report::*;
pub use encounter::*;
pub use immunization::*;
pub use medication_statement::*;
pub use observation::*;
pub use patient::*;
pub use practitioner::*;
pub use procedure::*;
