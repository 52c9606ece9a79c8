//! Initialization and lifecycle types

use serde::{Deserialize, Serialize};

use super::capabilities::{ClientCapabilities, ClientInfo, ServerCapabilities, ServerInfo};

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: ClientInfo,
}

/// Initialize response result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    pub fn new(protocol_version: String) -> Self {
        Self {
            protocol_version,
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo::default(),
            instructions: Some(
                "Solana MCP server. Tools wrap Solana JSON-RPC queries, Anchor IDL \
                 inspection, and transaction submission. Amounts are reported in SOL \
                 with the lamport value alongside (1 SOL = 10^9 lamports)."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MCP_PROTOCOL_VERSION;

    #[test]
    fn test_initialize_params_deserialize() {
        let json = r#"{
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0.0" }
        }"#;
        let params: InitializeParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.protocol_version, MCP_PROTOCOL_VERSION);
        assert_eq!(params.client_info.name, "test-client");
    }

    #[test]
    fn test_initialize_result_serialize() {
        let result = InitializeResult::new(MCP_PROTOCOL_VERSION.to_string());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("protocolVersion"));
        assert!(json.contains("solana-mcp"));
    }
}
