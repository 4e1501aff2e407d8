//! parse → map → assemble

use crate::assemble::assemble;
use crate::error::{MappingError, Result};
use crate::mapper::{map_to_fhir_resources, MappedDocument};
use crate::options::ConvertOptions;
use cobalt_ccda_format::{parse_with_options, MalformedDocumentError, ParseOptions};
use cobalt_models::{Bundle, IssueSeverity, OperationOutcome, OperationOutcomeIssue};

/// A converted document.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub bundle: Bundle,
    /// Sections that were skipped
    pub failures: Vec<MappingError>,
}

impl Conversion {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Skipped sections as an OperationOutcome, one `warning` per section.
    pub fn operation_outcome(&self) -> OperationOutcome {
        if self.failures.is_empty() {
            return OperationOutcome::all_ok();
        }
        OperationOutcome {
            id: None,
            issue: self
                .failures
                .iter()
                .map(|failure| OperationOutcomeIssue {
                    severity: IssueSeverity::Warning,
                    code: "processing".to_string(),
                    diagnostics: Some(failure.to_string()),
                })
                .collect(),
        }
    }
}

/// Parser settings for C-CDA: section narrative stays raw markup.
pub fn ccda_parse_options() -> ParseOptions {
    ParseOptions::new().verbatim("section/text")
}

/// Convert C-CDA XML into a FHIR Bundle.
#[tracing::instrument(skip_all, fields(document_id = tracing::field::Empty))]
pub fn convert(xml: &str, options: &ConvertOptions) -> Result<Conversion> {
    options.validate()?;
    let tree = parse_with_options(xml, &ccda_parse_options())?;

    let MappedDocument {
        document_id,
        resources,
        failures,
    } = map_to_fhir_resources(&tree, options)?;
    if let Some(id) = &document_id {
        tracing::Span::current().record("document_id", id.as_str());
    }

    let bundle = assemble(resources, options.bundle_type);
    tracing::info!(
        entries = bundle.entry_count(),
        skipped_sections = failures.len(),
        "Converted document"
    );
    Ok(Conversion { bundle, failures })
}

/// [`convert`] for raw bytes, which must be UTF-8.
pub fn convert_bytes(xml: &[u8], options: &ConvertOptions) -> Result<Conversion> {
    let xml = std::str::from_utf8(xml).map_err(MalformedDocumentError::from)?;
    convert(xml, options)
}
