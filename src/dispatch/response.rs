//! Response item encoding.

use serde_json::{json, Value};

use crate::error::{JpcError, Result};

/// Protocol version echoed in error bodies.
pub const JPC_VERSION: &str = "1.0";

/// Encode every result item as one JSON byte buffer.
pub fn encode_items(items: &[Value]) -> Result<Vec<Vec<u8>>> {
    items
        .iter()
        .map(|item| serde_json::to_vec(item).map_err(JpcError::from))
        .collect()
}

/// The single buffer returned for a failed request.
pub fn error_body(error: &JpcError, id: &str) -> Vec<u8> {
    json!({
        "error": error.to_string(),
        "kind": error.kind(),
        "jpc": JPC_VERSION,
        "id": id,
    })
    .to_string()
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        let body = error_body(&JpcError::unknown_command("launch"), "s1");
        let value: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["kind"], "unknown_command");
        assert_eq!(value["jpc"], "1.0");
        assert_eq!(value["id"], "s1");
        assert!(value["error"].as_str().unwrap().contains("launch"));
    }

    #[test]
    fn test_one_buffer_per_item() {
        let buffers = encode_items(&[json!({"opstamp": 0}), json!("title")]).unwrap();
        assert_eq!(buffers, vec![br#"{"opstamp":0}"#.to_vec(), br#""title""#.to_vec()]);
        assert!(encode_items(&[]).unwrap().is_empty());
    }
}
