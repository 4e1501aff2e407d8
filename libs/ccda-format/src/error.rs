use thiserror::Error;

/// The input could not be read as XML. Fatal for a whole conversion.
#[derive(Debug, Error)]
pub enum MalformedDocumentError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("document nests deeper than {limit} elements")]
    TooDeep { limit: usize },
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("narrative markup error: {0}")]
    Markup(#[from] quick_xml::Error),
    #[error("narrative write error: {0}")]
    Write(#[from] std::io::Error),
    #[error("rendered narrative is not valid UTF-8: {0}")]
    Utf8Output(#[from] std::string::FromUtf8Error),
}
