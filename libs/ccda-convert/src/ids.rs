//! Resource id allocation

use crate::options::IdStrategy;
use uuid::Uuid;

const ANONYMOUS_DOCUMENT: &str = "urn:cobalt:anonymous-document";

/// Allocates resource ids for one document.
///
/// With [`IdStrategy::Deterministic`] the n-th id of a given resource type is
/// a UUID v5 in a namespace derived from the document id, so converting the
/// same document twice produces the same ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    namespace: Uuid,
    ordinal: u64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy, document_id: Option<&str>) -> Self {
        let seed = document_id.unwrap_or(ANONYMOUS_DOCUMENT);
        Self {
            strategy,
            namespace: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()),
            ordinal: 0,
        }
    }

    pub fn next_id(&mut self, resource_type: &str) -> String {
        self.ordinal += 1;
        match self.strategy {
            IdStrategy::Deterministic => {
                let name = format!("{resource_type}/{}", self.ordinal);
                Uuid::new_v5(&self.namespace, name.as_bytes()).to_string()
            }
            IdStrategy::Random => Uuid::new_v4().to_string(),
        }
    }
}

/// `urn:uuid:<id>`, used both as `fullUrl` and as reference target.
pub fn urn(id: &str) -> String {
    format!("urn:uuid:{id}")
}
