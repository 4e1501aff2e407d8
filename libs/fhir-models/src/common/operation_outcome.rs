//! FHIR OperationOutcome model

use serde::{Deserialize, Serialize};

/// Information about the success/failure of an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// A single issue associated with the action
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

/// A single issue associated with the action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,

    /// Error or warning code from the IssueType value set
    pub code: String,

    /// Additional diagnostic information about the issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl OperationOutcome {
    /// An outcome with a single informational "all ok" issue
    pub fn all_ok() -> Self {
        Self {
            id: None,
            issue: vec![OperationOutcomeIssue {
                severity: IssueSeverity::Information,
                code: "informational".to_string(),
                diagnostics: Some("All OK".to_string()),
            }],
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.issue
            .iter()
            .any(|i| !matches!(i.severity, IssueSeverity::Information))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_ok() {
        let outcome = OperationOutcome::all_ok();
        assert!(!outcome.has_warnings());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "issue": [
                    { "severity": "information", "code": "informational", "diagnostics": "All OK" }
                ]
            })
        );
    }

    #[test]
    fn test_has_warnings() {
        let outcome = OperationOutcome {
            id: None,
            issue: vec![OperationOutcomeIssue {
                severity: IssueSeverity::Warning,
                code: "processing".to_string(),
                diagnostics: None,
            }],
        };
        assert!(outcome.has_warnings());
    }
}
