//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for the FHIR resources
//! produced when converting C-CDA documents.
//!
//! # Module Organization
//!
//! - `common`: Bundle, OperationOutcome, datatypes and errors shared by every resource
//! - `r4`: clinical resources shaped after FHIR R4
//! - `resource`: the [`Resource`] enum tagged by `resourceType`
//!
//! # Design Philosophy
//!
//! - **Absence is omission**: optional values are `Option`, repeated values
//!   are `Vec` and are never serialized when empty
//! - **Strongly-typed**: every resource has its own struct
//! - **Flexible**: everything serializes to and from FHIR JSON
//!
//! # Example
//!
//! ```rust
//! use cobalt_models::{Bundle, BundleEntry, BundleType, Patient, Resource};
//!
//! let mut bundle = Bundle::new(BundleType::Collection);
//! bundle.add_entry(BundleEntry::new(
//!     "urn:uuid:1",
//!     Resource::Patient(Patient {
//!         id: Some("1".to_string()),
//!         ..Default::default()
//!     }),
//! ));
//!
//! let json = bundle.to_value().unwrap();
//! assert_eq!(json["entry"][0]["resource"]["resourceType"], "Patient");
//! ```

pub mod common;
pub mod r4;
pub mod resource;

// Re-export commonly used types
pub use common::*;
pub use r4::*;
pub use resource::Resource;
