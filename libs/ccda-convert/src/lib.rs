//! C-CDA → FHIR R4 conversion
//!
//! The pipeline is linear and synchronous:
//!
//! 1. [`cobalt_ccda_format::parse`] builds the intermediate tree
//! 2. [`map_to_fhir_resources`] sanitizes it and maps the header and each
//!    recognised section to typed resources, skipping sections that fail
//! 3. [`assemble`] puts the resources into a Bundle
//!
//! [`convert`] runs all three.
//!
//! # Example
//!
//! ```rust
//! use cobalt_convert::{convert, ConvertOptions};
//!
//! let xml = r#"<ClinicalDocument xmlns="urn:hl7-org:v3">
//!   <id root="2.16.840.1.113883.19.5" extension="doc-1"/>
//!   <code code="34133-9" codeSystem="2.16.840.1.113883.6.1"/>
//!   <title>Summary</title>
//!   <recordTarget><patientRole><id root="1.2.3" extension="42"/></patientRole></recordTarget>
//! </ClinicalDocument>"#;
//!
//! let conversion = convert(xml, &ConvertOptions::default()).unwrap();
//! assert!(conversion.is_complete());
//! assert_eq!(conversion.bundle.entry_count(), 2); // Composition + Patient
//! ```

#![forbid(unsafe_code)]

pub mod assemble;
mod datatypes;
pub mod error;
mod header;
pub mod ids;
mod mapper;
pub mod options;
mod pipeline;
mod sections;
mod systems;

pub use assemble::assemble;
pub use datatypes::{date_from_hl7, date_time_from_hl7};
pub use error::{ConvertError, MappingError, Result};
pub use ids::IdGenerator;
pub use mapper::{map_to_fhir_resources, MappedDocument, MappedResource, Origin};
pub use options::{ConvertOptions, IdStrategy};
pub use pipeline::{ccda_parse_options, convert, convert_bytes, Conversion};
pub use sections::SectionKind;
pub use systems::system_uri;
