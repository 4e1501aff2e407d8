//! Resource enum covering every type a conversion run can emit

use crate::common::{Error, OperationOutcome, Result};
use crate::r4::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! resources {
    ($($name:ident),+ $(,)?) => {
        /// Any resource that can sit in a bundle entry, tagged by `resourceType`
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "resourceType")]
        pub enum Resource {
            $($name($name),)+
        }

        impl Resource {
            /// The FHIR resource type name, e.g. `"Patient"`
            pub fn resource_type(&self) -> &'static str {
                match self {
                    $(Resource::$name(_) => stringify!($name),)+
                }
            }

            /// Logical id, when assigned
            pub fn id(&self) -> Option<&str> {
                match self {
                    $(Resource::$name(r) => r.id.as_deref(),)+
                }
            }

            pub fn set_id(&mut self, id: impl Into<String>) {
                let id = Some(id.into());
                match self {
                    $(Resource::$name(r) => r.id = id,)+
                }
            }
        }

        $(
            impl From<$name> for Resource {
                fn from(resource: $name) -> Self {
                    Resource::$name(resource)
                }
            }
        )+
    };
}

resources!(
    AllergyIntolerance,
    Composition,
    Condition,
    DiagnosticReport,
    Encounter,
    Immunization,
    MedicationStatement,
    Observation,
    OperationOutcome,
    Patient,
    Practitioner,
    Procedure,
);

impl Resource {
    /// Parse any supported resource from JSON
    pub fn from_value(value: &Value) -> Result<Self> {
        match value.get("resourceType").and_then(Value::as_str) {
            Some(_) => serde_json::from_value(value.clone()).map_err(Error::from),
            None => Err(Error::InvalidResource(
                "missing resourceType".to_string(),
            )),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Local reference to this resource, `urn:uuid:<id>`
    pub fn urn(&self) -> Option<String> {
        self.id().map(|id| format!("urn:uuid:{id}"))
    }
}
