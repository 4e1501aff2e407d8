//! Conversion options

use crate::error::{ConvertError, Result};
use cobalt_models::BundleType;
use serde::{Deserialize, Serialize};

/// How resource ids are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// UUID v5 derived from the document id, so repeated runs agree
    #[default]
    Deterministic,
    /// UUID v4
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub bundle_type: BundleType,
    pub include_composition: bool,
    pub include_narrative: bool,
    pub id_strategy: IdStrategy,
    /// Abort on the first section failure instead of collecting it
    pub fail_fast: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            bundle_type: BundleType::Collection,
            include_composition: true,
            include_narrative: true,
            id_strategy: IdStrategy::Deterministic,
            fail_fast: false,
        }
    }
}

impl ConvertOptions {
    /// Options for a `document` Bundle (Composition first).
    pub fn document() -> Self {
        Self {
            bundle_type: BundleType::Document,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bundle_type == BundleType::Document && !self.include_composition {
            return Err(ConvertError::InvalidOptions(
                "a document bundle requires include_composition".to_string(),
            ));
        }
        Ok(())
    }
}
