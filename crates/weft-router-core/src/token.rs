//! Task token codec
//!
//! Respond and heartbeat calls carry no workflow id of their own; the
//! routing key is recovered by decoding the task token the worker echoes
//! back.

use weft_types::TaskToken;

use crate::error::RouterError;

/// Encodes and decodes opaque task tokens
pub trait TaskTokenSerializer: Send + Sync {
    fn serialize(&self, token: &TaskToken) -> Result<Vec<u8>, RouterError>;

    fn deserialize(&self, data: &[u8]) -> Result<TaskToken, RouterError>;
}

/// JSON task tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTaskTokenSerializer;

impl TaskTokenSerializer for JsonTaskTokenSerializer {
    fn serialize(&self, token: &TaskToken) -> Result<Vec<u8>, RouterError> {
        serde_json::to_vec(token).map_err(|e| RouterError::Internal(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> Result<TaskToken, RouterError> {
        serde_json::from_slice(data).map_err(|e| RouterError::MalformedToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_recovers_workflow_id() {
        let serializer = JsonTaskTokenSerializer;
        let token =
            TaskToken::new("domain-1", "payment-77", "run-1", 12).with_activity_id("charge");

        let bytes = serializer.serialize(&token).unwrap();
        let decoded = serializer.deserialize(&bytes).unwrap();

        assert_eq!(decoded.workflow_id, "payment-77");
        assert_eq!(decoded, token);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let result = JsonTaskTokenSerializer.deserialize(b"\x00not-json");
        assert!(matches!(result, Err(RouterError::MalformedToken(_))));
    }
}
