//! Error taxonomy for the MCP server
//!
//! Errors split into two propagation classes. Protocol-level failures
//! (`Validation`, `UnknownTool`, `UnknownPrompt`, `UnknownResource`) surface
//! through the JSON-RPC error channel before a handler ever runs. `Upstream`
//! failures raised inside a handler are caught at the dispatch boundary and
//! folded into error-flagged result content, so the calling agent always
//! receives a response. `TransportState` is the one case that becomes an
//! HTTP-level failure, on the SSE message endpoint.

use crate::protocol::JsonRpcError;

/// Result alias used throughout the crate.
pub type McpResult<T> = std::result::Result<T, McpError>;

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Tool input failed structural validation. `path` is the dotted path
    /// of the offending field (e.g. `filters.0.offset`).
    #[error("invalid argument at `{path}`: {message}")]
    Validation { path: String, message: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// A second registration under an already-taken name.
    #[error("duplicate registration: {0}")]
    DuplicateName(String),

    /// A message arrived with no routable connection to answer on.
    #[error("transport state: {0}")]
    TransportState(String),

    /// Any failure from an external collaborator: network, decode,
    /// missing data, or an error object in the RPC response.
    #[error("{0}")]
    Upstream(String),
}

impl McpError {
    /// Shorthand for a validation failure at a field path.
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        McpError::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an upstream collaborator failure.
    pub fn upstream(message: impl Into<String>) -> Self {
        McpError::Upstream(message.into())
    }

    /// Map this error onto the JSON-RPC error channel.
    ///
    /// `Upstream` never takes this path in practice (dispatch converts it to
    /// result content first), but the mapping is total so the transport can
    /// encode anything it is handed.
    pub fn to_jsonrpc(&self) -> JsonRpcError {
        match self {
            McpError::Validation { path, message } => {
                JsonRpcError::invalid_params(format!("invalid argument at `{path}`: {message}"))
                    .with_data(serde_json::json!({ "path": path }))
            }
            McpError::UnknownTool(name) => {
                JsonRpcError::invalid_params(format!("Unknown tool: {name}"))
            }
            McpError::UnknownPrompt(name) => {
                JsonRpcError::invalid_params(format!("Unknown prompt: {name}"))
            }
            McpError::UnknownResource(uri) => JsonRpcError::resource_not_found(uri),
            McpError::DuplicateName(name) => {
                JsonRpcError::internal_error(format!("duplicate registration: {name}"))
            }
            McpError::TransportState(msg) => {
                JsonRpcError::internal_error(format!("transport state: {msg}"))
            }
            McpError::Upstream(msg) => JsonRpcError::internal_error(msg.clone()),
        }
    }
}

impl From<reqwest::Error> for McpError {
    fn from(e: reqwest::Error) -> Self {
        McpError::Upstream(e.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(e: serde_json::Error) -> Self {
        McpError::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_carries_path() {
        let err = McpError::validation("publicKey", "expected string");
        let rpc = err.to_jsonrpc();
        assert_eq!(rpc.code, -32602);
        assert_eq!(rpc.data.unwrap()["path"], "publicKey");
    }

    #[test]
    fn test_unknown_tool_is_invalid_params() {
        let rpc = McpError::UnknownTool("nope".to_string()).to_jsonrpc();
        assert_eq!(rpc.code, -32602);
        assert!(rpc.message.contains("nope"));
    }
}
