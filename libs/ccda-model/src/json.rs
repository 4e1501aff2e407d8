//! JSON view of the intermediate tree
//!
//! Uses the convention common to XML-to-JSON tooling: attributes are keys
//! prefixed with `@_`, the null flavor is `@_nullFlavor` and mixed text sits
//! under `#text`. Useful for debugging output and for writing fixtures.

use crate::node::{CcdaNode, Element, Key, Scalar};
use crate::null_flavor::NullFlavor;
use serde_json::{Map, Number, Value};

pub const ATTRIBUTE_PREFIX: &str = "@_";
pub const NULL_FLAVOR_KEY: &str = "@_nullFlavor";
pub const TEXT_KEY: &str = "#text";

impl CcdaNode {
    /// Render the node as JSON.
    pub fn to_json(&self) -> Value {
        match self {
            CcdaNode::Scalar(scalar) => scalar_to_json(scalar),
            CcdaNode::Sequence(items) => Value::Array(items.iter().map(CcdaNode::to_json).collect()),
            CcdaNode::Element(element) => element_to_json(element),
        }
    }

    /// Build a node from JSON. `null` is absence; `null` items inside arrays
    /// and objects are skipped.
    pub fn from_json(value: &Value) -> Option<CcdaNode> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(CcdaNode::Scalar(Scalar::Bool(*b))),
            Value::Number(n) => n.as_f64().map(|f| CcdaNode::Scalar(Scalar::Number(f))),
            Value::String(s) => Some(CcdaNode::Scalar(Scalar::Text(s.clone()))),
            Value::Array(items) => Some(CcdaNode::Sequence(
                items.iter().filter_map(CcdaNode::from_json).collect(),
            )),
            Value::Object(map) => Some(CcdaNode::Element(element_from_json(map))),
        }
    }
}

fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Text(s) => Value::String(s.clone()),
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Number(n) => {
            if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                Value::from(*n as i64)
            } else {
                Number::from_f64(*n).map_or(Value::Null, Value::Number)
            }
        }
    }
}

fn element_to_json(element: &Element) -> Value {
    let mut map = Map::new();
    if let Some(null_flavor) = element.null_flavor() {
        map.insert(
            NULL_FLAVOR_KEY.to_string(),
            Value::String(null_flavor.code().to_string()),
        );
    }
    for (key, value) in element.entries() {
        let name = match key {
            Key::Attribute(name) => format!("{ATTRIBUTE_PREFIX}{name}"),
            Key::Child(name) => name.clone(),
            Key::Text => TEXT_KEY.to_string(),
        };
        map.insert(name, value.to_json());
    }
    Value::Object(map)
}

fn element_from_json(map: &Map<String, Value>) -> Element {
    let mut element = Element::new();
    for (name, value) in map {
        if name == NULL_FLAVOR_KEY {
            let code = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            element.set_null_flavor(Some(NullFlavor::parse(&code)));
            continue;
        }

        let Some(node) = CcdaNode::from_json(value) else {
            continue;
        };
        let key = if name == TEXT_KEY {
            Key::Text
        } else if let Some(attribute) = name.strip_prefix(ATTRIBUTE_PREFIX) {
            Key::Attribute(attribute.to_string())
        } else {
            Key::Child(name.clone())
        };
        element.insert(key, node);
    }
    element
}
