//! Long-running operations returned by asynchronous triggers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Prefix of every operation name.
pub const OPERATION_PREFIX: &str = "operations/";

/// Error carried by a finished operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    /// gRPC status code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

/// An asynchronous operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// `operations/{uuid}`.
    pub name: String,
    /// Whether the operation has finished.
    pub done: bool,
    /// Result, once done without error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// Failure, once done with error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl Operation {
    /// A new pending operation with a fresh name.
    pub fn pending() -> Self {
        Self {
            name: format!("{}{}", OPERATION_PREFIX, Uuid::new_v4()),
            done: false,
            response: None,
            error: None,
        }
    }

    /// Id part of the name.
    pub fn id(&self) -> &str {
        self.name.strip_prefix(OPERATION_PREFIX).unwrap_or(&self.name)
    }

    /// Finish with a response.
    pub fn succeed(&mut self, response: Value) {
        self.done = true;
        self.response = Some(response);
        self.error = None;
    }

    /// Finish with an error.
    pub fn fail(&mut self, code: i32, message: impl Into<String>) {
        self.done = true;
        self.response = None;
        self.error = Some(OperationError {
            code,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_operation_has_prefix() {
        let op = Operation::pending();
        assert!(op.name.starts_with(OPERATION_PREFIX));
        assert!(!op.done);
        assert_eq!(op.id().len(), 36);

        let wire = serde_json::to_value(&op).unwrap();
        assert!(wire.get("response").is_none());
        assert_eq!(wire["done"], false);
    }

    #[test]
    fn finishing() {
        let mut op = Operation::pending();
        op.succeed(json!({ "outputs": [] }));
        assert!(op.done);
        assert!(op.error.is_none());

        op.fail(13, "boom");
        assert!(op.response.is_none());
        assert_eq!(op.error.as_ref().unwrap().message, "boom");
    }
}
