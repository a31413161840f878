//! Outcome of a schema manager operation

use std::fmt;

use serde::Serialize;

/// Outcome of a schema manager operation; expected failures are reported
/// here instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
}

impl ManagerResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            exception_message: None,
            namespace: None,
            schema_name: None,
        }
    }

    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            exception_message: Some(error.to_string()),
            namespace: None,
            schema_name: None,
        }
    }

    /// Converts a failed result into an error for `?` propagation
    pub fn into_result(self) -> anyhow::Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(anyhow::anyhow!(self.message))
        }
    }
}

impl fmt::Display for ManagerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "ok" } else { "failed" };
        write!(f, "[{}] {}", status, self.message)
    }
}
