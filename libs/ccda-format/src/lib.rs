//! C-CDA XML helpers.
//!
//! - [`parse`] turns raw XML into the intermediate [`CcdaNode`] tree. The
//!   parser is schema-agnostic: attributes become attribute keys, repeated
//!   siblings become sequences and `nullFlavor` is lifted onto the element.
//! - [`render_narrative`] rewrites CDA narrative markup (`paragraph`,
//!   `list`, `content`, ...) as an XHTML `div` suitable for FHIR `Narrative`.

#![forbid(unsafe_code)]

mod error;
mod narrative;
mod parser;

pub use cobalt_ccda_model::CcdaNode;
pub use error::MalformedDocumentError;
pub use narrative::{render_narrative, XHTML_NS};
pub use parser::{parse, parse_bytes, parse_with_options, ParseOptions, MAX_DEPTH};
