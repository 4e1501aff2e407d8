use crate::error::MalformedDocumentError;
use cobalt_ccda_model::{CcdaNode, Element, Key, NullFlavor};
use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, Node};

const NULL_FLAVOR_ATTRIBUTE: &str = "nullFlavor";

/// Deepest element nesting accepted. Tree building and sanitizing recurse
/// once per level.
pub const MAX_DEPTH: usize = 128;

/// Parser settings.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    verbatim: Vec<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the inner markup of matching elements as a single text scalar
    /// instead of building a subtree.
    ///
    /// `path` is either a local element name (`text`) or `parent/child`
    /// (`section/text`).
    pub fn verbatim(mut self, path: impl Into<String>) -> Self {
        self.verbatim.push(path.into());
        self
    }

    fn is_verbatim(&self, parent: Option<&str>, name: &str) -> bool {
        self.verbatim.iter().any(|path| match path.split_once('/') {
            Some((expected_parent, child)) => child == name && parent == Some(expected_parent),
            None => path == name,
        })
    }
}

/// Parse an XML document into the intermediate tree.
///
/// The result is an element with a single child named after the root element,
/// e.g. `{ "ClinicalDocument": { ... } }`.
pub fn parse(input: &str) -> Result<CcdaNode, MalformedDocumentError> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse raw bytes, rejecting anything that is not UTF-8.
pub fn parse_bytes(input: &[u8]) -> Result<CcdaNode, MalformedDocumentError> {
    parse(std::str::from_utf8(input)?)
}

pub fn parse_with_options(
    input: &str,
    options: &ParseOptions,
) -> Result<CcdaNode, MalformedDocumentError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    check_depth(input)?;
    let doc = Document::parse(input)?;
    let root = doc.root_element();

    let name = qualified_name(&root);
    let node = element_to_node(input, &root, None, options);
    Ok(CcdaNode::Element(Element::new().with_child(&name, node)))
}

/// Streams the input once and rejects nesting beyond [`MAX_DEPTH`].
///
/// Markup errors end the scan early; `Document::parse` reports them.
fn check_depth(input: &str) -> Result<(), MalformedDocumentError> {
    let mut reader = Reader::from_str(input);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(MalformedDocumentError::TooDeep { limit: MAX_DEPTH });
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn element_to_node(
    source: &str,
    node: &Node,
    parent: Option<&str>,
    options: &ParseOptions,
) -> CcdaNode {
    let local_name = node.tag_name().name();
    if options.is_verbatim(parent, local_name) {
        return CcdaNode::from(inner_markup(source, node));
    }

    let mut element = Element::new();
    for attr in node.attributes() {
        if attr.namespace().is_none() && attr.name() == NULL_FLAVOR_ATTRIBUTE {
            element.set_null_flavor(Some(NullFlavor::parse(attr.value())));
            continue;
        }
        let name = match attr.namespace().and_then(|ns| prefix_for(node, ns)) {
            Some(prefix) => format!("{prefix}:{}", attr.name()),
            None => attr.name().to_string(),
        };
        element.insert(Key::Attribute(name), CcdaNode::from(attr.value()));
    }

    let mut text = Vec::new();
    for child in node.children() {
        if child.is_element() {
            let value = element_to_node(source, &child, Some(local_name), options);
            element.append_child(&qualified_name(&child), value);
        } else if child.is_text() {
            if let Some(segment) = child.text().map(str::trim).filter(|t| !t.is_empty()) {
                text.push(segment);
            }
        }
    }
    let text = text.join(" ");

    // Text-only and empty elements collapse to a plain scalar
    if element.is_empty() && element.null_flavor().is_none() {
        return CcdaNode::from(text);
    }
    if !text.is_empty() {
        element.insert(Key::Text, CcdaNode::from(text));
    }
    CcdaNode::Element(element)
}

/// Element name with its namespace prefix, unless it is in the default namespace.
fn qualified_name(node: &Node) -> String {
    let tag = node.tag_name();
    match tag.namespace().and_then(|ns| prefix_for(node, ns)) {
        Some(prefix) => format!("{prefix}:{}", tag.name()),
        None => tag.name().to_string(),
    }
}

fn prefix_for(node: &Node, uri: &str) -> Option<String> {
    if node.is_element() && node.default_namespace() == Some(uri) {
        return None;
    }
    node.lookup_prefix(uri)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}

fn inner_markup<'a>(source: &'a str, node: &Node) -> &'a str {
    let (Some(first), Some(last)) = (node.first_child(), node.last_child()) else {
        return "";
    };
    source
        .get(first.range().start..last.range().end)
        .map(str::trim)
        .unwrap_or("")
}
