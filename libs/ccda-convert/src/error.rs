//! Conversion errors

use cobalt_ccda_format::MalformedDocumentError;
use thiserror::Error;

/// A section (or the document header) could not be mapped.
///
/// Recovered by the mapper: the section's resources are skipped and the error
/// is kept on the mapped document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{section}: {reason} (at {path})")]
pub struct MappingError {
    /// Section name, e.g. `immunizations` or `patient`
    pub section: String,
    /// Slash-separated location inside the section
    pub path: String,
    pub reason: String,
}

impl MappingError {
    pub fn new(
        section: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] MalformedDocumentError),

    #[error("Not a clinical document: root element is {0}")]
    NotClinicalDocument(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Mapping failed: {0}")]
    Mapping(#[from] MappingError),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
