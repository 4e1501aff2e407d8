//! FHIR Bundle model
//!
//! The container returned by a conversion run.

use super::error::{Error, Result};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// FHIR Bundle resource
///
/// A container for a collection of resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Indicates the purpose of this bundle - how it was intended to be used
    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

/// Type of Bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    /// Document Bundle - A set of resources composing a single coherent document
    Document,
    /// Collection Bundle - A set of resources collected for a specific purpose
    #[default]
    Collection,
}

/// Entry in the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// URI for the entry (`urn:uuid:...` for converted resources)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in this bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
}

impl BundleEntry {
    pub fn new(full_url: impl Into<String>, resource: Resource) -> Self {
        Self {
            full_url: Some(full_url.into()),
            resource: Some(resource),
        }
    }
}

impl Bundle {
    /// Create a new Bundle with minimal required fields
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: None,
            bundle_type,
            entry: None,
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        let bundle: Self = serde_json::from_value(value.clone()).map_err(Error::from)?;
        if bundle.resource_type != "Bundle" {
            return Err(Error::UnexpectedResourceType {
                expected: "Bundle".to_string(),
                actual: bundle.resource_type,
            });
        }
        Ok(bundle)
    }

    /// Convert to JSON Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Check if this is a document bundle
    pub fn is_document(&self) -> bool {
        matches!(self.bundle_type, BundleType::Document)
    }

    /// Get the number of entries in the bundle
    pub fn entry_count(&self) -> usize {
        self.entry.as_ref().map(|e| e.len()).unwrap_or(0)
    }

    /// Get entries as a slice
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    /// Resources in entry order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entries().iter().filter_map(|e| e.resource.as_ref())
    }

    /// Resources of one type, e.g. `"Immunization"`
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources()
            .filter(move |r| r.resource_type() == resource_type)
    }

    /// Add an entry to the bundle
    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entry.get_or_insert_with(Vec::new).push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r4::Patient;
    use serde_json::json;

    #[test]
    fn test_deserialize_bundle() {
        let json = json!({
            "resourceType": "Bundle",
            "id": "example-bundle",
            "type": "collection",
            "entry": [
                {
                    "fullUrl": "urn:uuid:123",
                    "resource": {
                        "resourceType": "Patient",
                        "id": "123"
                    }
                }
            ]
        });

        let bundle = Bundle::from_value(&json).unwrap();
        assert_eq!(bundle.id, Some("example-bundle".to_string()));
        assert_eq!(bundle.bundle_type, BundleType::Collection);
        assert_eq!(bundle.entry_count(), 1);
        assert_eq!(bundle.resources_of_type("Patient").count(), 1);
    }

    #[test]
    fn test_rejects_other_resource_types() {
        let json = json!({ "resourceType": "Patient", "type": "collection" });
        assert!(matches!(
            Bundle::from_value(&json),
            Err(Error::UnexpectedResourceType { .. })
        ));
    }

    #[test]
    fn test_empty_bundle_has_no_entry_field() {
        let bundle = Bundle::new(BundleType::Collection);
        let json = bundle.to_value().unwrap();
        assert_eq!(json, json!({ "resourceType": "Bundle", "type": "collection" }));
    }

    #[test]
    fn test_is_document() {
        assert!(Bundle::new(BundleType::Document).is_document());
        assert!(!Bundle::new(BundleType::Collection).is_document());
    }

    #[test]
    fn test_add_entry_keeps_order() {
        let mut bundle = Bundle::new(BundleType::Collection);
        for id in ["a", "b", "c"] {
            bundle.add_entry(BundleEntry::new(
                format!("urn:uuid:{id}"),
                Resource::Patient(Patient {
                    id: Some(id.to_string()),
                    ..Default::default()
                }),
            ));
        }

        let ids: Vec<_> = bundle.resources().filter_map(Resource::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
