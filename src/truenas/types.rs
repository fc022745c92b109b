//! TrueNAS API Wire Types
//!
//! Control requests built by the action registry use the middleware's
//! JSON-RPC framing (`msg = "method"`). Only the request side lives here;
//! responses are read by the appliance client.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub id: String,
    pub msg: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// A method call with positional parameters.
    pub fn call(id: u64, method: &str, params: serde_json::Value) -> Self {
        Self {
            id: id.to_string(),
            msg: "method".to_string(),
            method: method.to_string(),
            params: Some(params),
        }
    }
}
