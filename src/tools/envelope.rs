//! JSON envelopes returned to the MCP client.
//!
//! Tool calls never fail because Mem0 did: remote errors are folded into a
//! `{"error", "status", "payload"}` object the model can read.

use crate::mem0::StoreResult;
use serde_json::json;

pub const MESSAGES_MISSING: &str = "messages_missing";
pub const SCOPE_MISSING: &str = "scope_missing";
pub const CLIENT_UNAVAILABLE: &str = "client_unavailable";

/// Serialize a remote result, or its failure, as a JSON string.
pub fn store_envelope(result: StoreResult) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(err) => {
            tracing::error!(status = ?err.status, "Mem0 call failed: {}", err);
            json!({
                "error": err.message,
                "status": err.status,
                "payload": err.payload,
            })
            .to_string()
        }
    }
}

/// Local validation failure, reported to the caller instead of raised.
pub fn validation_error(error: &str, detail: &str) -> String {
    json!({ "error": error, "detail": detail }).to_string()
}
