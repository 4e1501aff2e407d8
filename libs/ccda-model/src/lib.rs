//! Intermediate C-CDA document model
//!
//! This crate provides the untyped tree that sits between raw C-CDA XML and
//! typed FHIR resources, plus the null-flavor sanitizer that strips HL7
//! "no information" markers from it.
//!
//! # Module Organization
//!
//! - `node`: the [`CcdaNode`] sum type (scalar, sequence, keyed element)
//! - `null_flavor`: the HL7 v3 NullFlavor vocabulary
//! - `sanitize`: recursive removal of null-flavored subtrees
//! - `json`: conversion to and from the `@_attribute` JSON convention
//!
//! # Example
//!
//! ```rust
//! use cobalt_ccda_model::{sanitize, CcdaNode};
//! use serde_json::json;
//!
//! let code = CcdaNode::from_json(&json!({
//!     "@_nullFlavor": "OTH",
//!     "translation": [{ "@_code": "123" }]
//! }))
//! .unwrap();
//!
//! let clean = sanitize(&code).unwrap();
//! assert_eq!(clean.to_json(), json!({ "translation": [{ "@_code": "123" }] }));
//! ```

#![forbid(unsafe_code)]

pub mod json;
pub mod node;
pub mod null_flavor;
pub mod sanitize;

pub use json::{ATTRIBUTE_PREFIX, NULL_FLAVOR_KEY, TEXT_KEY};
pub use node::{CcdaNode, Element, Key, Scalar};
pub use null_flavor::NullFlavor;
pub use sanitize::{is_null_flavored, sanitize, sanitize_element, sanitize_opt};
