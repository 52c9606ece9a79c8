//! Transport bridges: stdio and HTTP/SSE
//!
//! Both transports funnel raw JSON lines through [`handle_message`], which
//! classifies the envelope and routes it. Requests produce exactly one
//! response; notifications and peer responses produce none; unparseable
//! input produces a parse-error response with a null id.

pub mod sse;
pub mod stdio;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::handlers::ServerState;
use crate::protocol::{
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
};

/// Classify and route one raw message. `None` means nothing goes back on
/// the wire.
pub async fn handle_message(state: &Arc<ServerState>, raw: &str) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("unparseable message: {}", e);
            return Some(JsonRpcResponse::error(
                RequestId::Null,
                JsonRpcError::parse_error(),
            ));
        }
    };

    if value.get("id").is_some() && value.get("method").is_some() {
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!("malformed request: {}", e);
                return Some(JsonRpcResponse::error(
                    RequestId::Null,
                    JsonRpcError::invalid_request(),
                ));
            }
        };
        return Some(state.handle_request(request).await);
    }

    if value.get("method").is_some() {
        match serde_json::from_value::<JsonRpcNotification>(value) {
            Ok(notification) => state.handle_notification(notification),
            Err(e) => warn!("malformed notification: {}", e),
        }
        return None;
    }

    // A response from the peer; this server sends no requests, so log and drop.
    debug!("ignoring peer response");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagLog;
    use crate::registry::{PromptRegistry, ResourceRegistry, ToolRegistry};

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState::new(
            ToolRegistry::new(),
            ResourceRegistry::new(),
            PromptRegistry::new(),
            DiagLog::disabled(),
        ))
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let response = handle_message(&state(), "{not json").await.unwrap();
        assert_eq!(response.id, RequestId::Null);
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn test_notification_produces_no_response() {
        let raw = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(handle_message(&state(), raw).await.is_none());
    }

    #[tokio::test]
    async fn test_peer_response_ignored() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"result":{}}"#;
        assert!(handle_message(&state(), raw).await.is_none());
    }

    #[tokio::test]
    async fn test_request_answered_with_same_id() {
        let raw = r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#;
        let response = handle_message(&state(), raw).await.unwrap();
        assert_eq!(response.id, RequestId::Number(7));
    }
}
