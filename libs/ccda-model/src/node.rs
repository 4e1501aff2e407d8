//! Intermediate document tree
//!
//! A [`CcdaNode`] mirrors the XML it was built from without imposing C-CDA
//! semantics: elements become keyed mappings, repeated siblings become
//! sequences and leaf text becomes scalars. Attributes and child elements live
//! in the same mapping but are distinguished by [`Key`], and the HL7
//! `nullFlavor` marker is lifted out of the attribute set into a dedicated
//! field on [`Element`].

use crate::null_flavor::NullFlavor;
use std::fmt;

/// Leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Key of an entry in an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// XML attribute, possibly prefixed (`xsi:type`)
    Attribute(String),
    /// Child element, possibly prefixed (`sdtc:raceCode`)
    Child(String),
    /// Text content of an element that also has attributes or children
    Text,
}

impl Key {
    pub fn attribute(name: impl Into<String>) -> Self {
        Key::Attribute(name.into())
    }

    pub fn child(name: impl Into<String>) -> Self {
        Key::Child(name.into())
    }

    /// Attribute or element name; `None` for [`Key::Text`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Attribute(name) | Key::Child(name) => Some(name),
            Key::Text => None,
        }
    }
}

/// A node of the intermediate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CcdaNode {
    Scalar(Scalar),
    Sequence(Vec<CcdaNode>),
    Element(Element),
}

/// Keyed mapping built from an XML element.
///
/// Keys are unique. Equality ignores entry order.
#[derive(Debug, Clone, Default)]
pub struct Element {
    null_flavor: Option<NullFlavor>,
    entries: Vec<(Key, CcdaNode)>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.null_flavor == other.null_flavor
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null_flavor(&self) -> Option<&NullFlavor> {
        self.null_flavor.as_ref()
    }

    pub fn set_null_flavor(&mut self, null_flavor: Option<NullFlavor>) {
        self.null_flavor = null_flavor;
    }

    pub fn with_null_flavor(mut self, null_flavor: NullFlavor) -> Self {
        self.null_flavor = Some(null_flavor);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(Key::Attribute(name.into()), CcdaNode::from(value.into()));
        self
    }

    /// Add a child element, grouping repeats into a sequence.
    pub fn with_child(mut self, name: &str, value: impl Into<CcdaNode>) -> Self {
        self.append_child(name, value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.insert(Key::Text, CcdaNode::from(text.into()));
        self
    }

    pub fn entries(&self) -> &[(Key, CcdaNode)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(Key, CcdaNode)> {
        self.entries
    }

    /// Number of entries, not counting the null flavor.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the element has no entries (a null flavor alone does not count).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&CcdaNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, key: Key, value: CcdaNode) -> Option<CcdaNode> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &Key) -> Option<CcdaNode> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Append a child element. A second child with the same name turns the
    /// entry into a [`CcdaNode::Sequence`] in insertion order.
    pub fn append_child(&mut self, name: &str, value: CcdaNode) {
        let existing = self
            .entries
            .iter_mut()
            .find(|(k, _)| matches!(k, Key::Child(n) if n == name));

        match existing {
            None => self.entries.push((Key::Child(name.to_string()), value)),
            Some((_, CcdaNode::Sequence(items))) => items.push(value),
            Some((_, slot)) => {
                let first = std::mem::replace(slot, CcdaNode::Sequence(Vec::with_capacity(2)));
                if let CcdaNode::Sequence(items) = slot {
                    items.push(first);
                    items.push(value);
                }
            }
        }
    }

    /// Attribute value when it is text.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|(k, v)| match k {
            Key::Attribute(n) if n == name => v.as_str(),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&CcdaNode> {
        self.entries.iter().find_map(|(k, v)| match k {
            Key::Child(n) if n == name => Some(v),
            _ => None,
        })
    }

    /// Text content stored under [`Key::Text`].
    pub fn text(&self) -> Option<&str> {
        self.get(&Key::Text).and_then(CcdaNode::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &CcdaNode)> {
        self.entries.iter().filter_map(|(k, v)| match k {
            Key::Attribute(n) => Some((n.as_str(), v)),
            _ => None,
        })
    }

    pub fn child_entries(&self) -> impl Iterator<Item = (&str, &CcdaNode)> {
        self.entries.iter().filter_map(|(k, v)| match k {
            Key::Child(n) => Some((n.as_str(), v)),
            _ => None,
        })
    }
}

impl CcdaNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            CcdaNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            CcdaNode::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[CcdaNode]> {
        match self {
            CcdaNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Text of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Iterate a node as a list: the items of a sequence, or the node itself.
    ///
    /// C-CDA elements may repeat, so navigation code should treat every child
    /// as "one or more" through this method.
    pub fn iter(&self) -> std::slice::Iter<'_, CcdaNode> {
        match self {
            CcdaNode::Sequence(items) => items.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }

    /// First item of a sequence, or the node itself.
    pub fn first(&self) -> Option<&CcdaNode> {
        self.iter().next()
    }

    /// Named child of the first element.
    pub fn child(&self, name: &str) -> Option<&CcdaNode> {
        self.iter()
            .filter_map(CcdaNode::as_element)
            .find_map(|element| element.child(name))
    }

    /// Attribute of the first element.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.iter()
            .filter_map(CcdaNode::as_element)
            .find_map(|element| element.attribute(name))
    }

    pub fn null_flavor(&self) -> Option<&NullFlavor> {
        self.first()
            .and_then(CcdaNode::as_element)
            .and_then(Element::null_flavor)
    }

    /// Text of a scalar, or the text entry of an element.
    pub fn text_content(&self) -> Option<&str> {
        match self.first()? {
            CcdaNode::Scalar(scalar) => scalar.as_str(),
            CcdaNode::Element(element) => element.text(),
            CcdaNode::Sequence(_) => None,
        }
    }

    /// Every node reached by a `/`-separated child path, fanning out over
    /// repeated elements at each step, in document order.
    pub fn find_all<'a>(&'a self, path: &str) -> Vec<&'a CcdaNode> {
        let mut current: Vec<&'a CcdaNode> = self.iter().collect();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .filter_map(CcdaNode::as_element)
                .filter_map(|element| element.child(segment))
                .flat_map(|node| node.iter())
                .collect();
        }
        current
    }

    /// First node reached by a `/`-separated child path.
    pub fn path(&self, path: &str) -> Option<&CcdaNode> {
        self.find_all(path).into_iter().next()
    }
}

impl From<Element> for CcdaNode {
    fn from(element: Element) -> Self {
        CcdaNode::Element(element)
    }
}

impl From<Scalar> for CcdaNode {
    fn from(scalar: Scalar) -> Self {
        CcdaNode::Scalar(scalar)
    }
}

impl From<Vec<CcdaNode>> for CcdaNode {
    fn from(items: Vec<CcdaNode>) -> Self {
        CcdaNode::Sequence(items)
    }
}

impl From<String> for CcdaNode {
    fn from(text: String) -> Self {
        CcdaNode::Scalar(Scalar::Text(text))
    }
}

impl From<&str> for CcdaNode {
    fn from(text: &str) -> Self {
        CcdaNode::Scalar(Scalar::Text(text.to_string()))
    }
}

impl From<bool> for CcdaNode {
    fn from(value: bool) -> Self {
        CcdaNode::Scalar(Scalar::Bool(value))
    }
}

impl From<f64> for CcdaNode {
    fn from(value: f64) -> Self {
        CcdaNode::Scalar(Scalar::Number(value))
    }
}
