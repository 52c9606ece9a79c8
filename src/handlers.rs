//! Request routing
//!
//! One entry point per JSON-RPC message class. `handle_request` always
//! produces a response for the same id; `handle_notification` produces
//! nothing. Registries are immutable after construction, so a shared
//! `ServerState` serves concurrent requests without locking anything but
//! the client-info slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::diag::DiagLog;
use crate::protocol::{
    ClientInfo, InitializeParams, InitializeResult, JsonRpcError, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, PromptsGetParams, PromptsListResult, RequestId,
    ResourceTemplatesListResult, ResourcesListResult, ResourcesReadParams, ToolsCallParams,
    ToolsListResult, MCP_PROTOCOL_VERSION,
};
use crate::registry::{PromptRegistry, ResourceRegistry, ToolRegistry};

/// State shared across transports and in-flight requests.
pub struct ServerState {
    initialized: AtomicBool,
    client: Mutex<Option<ClientInfo>>,
    pub tools: ToolRegistry,
    pub resources: ResourceRegistry,
    pub prompts: PromptRegistry,
    pub diag: DiagLog,
}

impl ServerState {
    pub fn new(
        tools: ToolRegistry,
        resources: ResourceRegistry,
        prompts: PromptRegistry,
        diag: DiagLog,
    ) -> Self {
        Self {
            initialized: AtomicBool::new(false),
            client: Mutex::new(None),
            tools,
            resources,
            prompts,
            diag,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Client info captured during `initialize`, if any.
    pub fn client_info(&self) -> Option<ClientInfo> {
        self.client.lock().ok().and_then(|slot| slot.clone())
    }

    /// Route one request to its handler and produce the response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let params = request.params.unwrap_or(Value::Null);

        debug!("request: {} (id {})", request.method, id);

        match request.method.as_str() {
            "initialize" => self.initialize(id, params),
            "ping" => ok(id, serde_json::json!({})),
            _ if !self.is_initialized() => {
                warn!("request `{}` before initialization", request.method);
                JsonRpcResponse::error(id, JsonRpcError::not_initialized())
            }
            "tools/list" => ok(
                id,
                ToolsListResult {
                    tools: self.tools.list(),
                    next_cursor: None,
                },
            ),
            "tools/call" => self.tools_call(id, params).await,
            "resources/list" => ok(
                id,
                ResourcesListResult {
                    resources: self.resources.list(),
                    next_cursor: None,
                },
            ),
            "resources/templates/list" => ok(
                id,
                ResourceTemplatesListResult {
                    resource_templates: self.resources.templates(),
                    next_cursor: None,
                },
            ),
            "resources/read" => self.resources_read(id, params).await,
            "prompts/list" => ok(
                id,
                PromptsListResult {
                    prompts: self.prompts.list(),
                    next_cursor: None,
                },
            ),
            "prompts/get" => self.prompts_get(id, params),
            method => {
                warn!("method not found: {}", method);
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Consume a notification. Never answered, even on error.
    pub fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                debug!("client reports initialized");
            }
            "notifications/cancelled" => {
                // Cancellation is advisory; in-flight handlers run to completion.
                debug!("cancellation notification received");
            }
            method => {
                debug!("ignoring notification: {}", method);
            }
        }
    }

    fn initialize(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let params: InitializeParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("invalid initialize params: {e}")),
                )
            }
        };

        info!(
            "initialize from {} (protocol {})",
            params.client_info.name, params.protocol_version
        );
        if params.protocol_version != MCP_PROTOCOL_VERSION {
            warn!(
                "client protocol {} differs from {}, continuing anyway",
                params.protocol_version, MCP_PROTOCOL_VERSION
            );
        }

        if let Ok(mut slot) = self.client.lock() {
            *slot = Some(params.client_info);
        }
        self.initialized.store(true, Ordering::Release);

        ok(id, InitializeResult::new(MCP_PROTOCOL_VERSION.to_string()))
    }

    async fn tools_call(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let params: ToolsCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("invalid tools/call params: {e}")),
                )
            }
        };

        match self.tools.dispatch(&params.name, params.arguments).await {
            Ok(result) => ok(id, result),
            Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc()),
        }
    }

    async fn resources_read(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let params: ResourcesReadParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("invalid resources/read params: {e}")),
                )
            }
        };

        match self.resources.resolve(&params.uri).await {
            Ok(result) => ok(id, result),
            Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc()),
        }
    }

    fn prompts_get(&self, id: RequestId, params: Value) -> JsonRpcResponse {
        let params: PromptsGetParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("invalid prompts/get params: {e}")),
                )
            }
        };

        match self.prompts.render(&params.name, params.arguments.as_ref()) {
            Ok(result) => ok(id, result),
            Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc()),
        }
    }
}

fn ok<T: Serialize>(id: RequestId, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            JsonRpcError::internal_error(format!("result serialization: {e}")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolContent;
    use crate::registry::ToolDef;
    use crate::schema::InputSchema;
    use serde_json::json;

    fn state() -> ServerState {
        let mut tools = ToolRegistry::new();
        tools
            .register(ToolDef::new(
                "getSlot",
                "Get the current slot",
                InputSchema::new(),
                |_| async { Ok(vec![ToolContent::text("Current slot: 1")]) },
            ))
            .unwrap();
        ServerState::new(
            tools,
            ResourceRegistry::new(),
            PromptRegistry::new(),
            DiagLog::disabled(),
        )
    }

    fn initialize_request(id: i64) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "initialize").with_params(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }))
    }

    #[tokio::test]
    async fn test_request_before_initialize_rejected() {
        let state = state();
        let response = state
            .handle_request(JsonRpcRequest::new(1, "tools/list"))
            .await;
        assert_eq!(response.error.unwrap().code, -32002);
    }

    #[tokio::test]
    async fn test_ping_allowed_before_initialize() {
        let state = state();
        let response = state.handle_request(JsonRpcRequest::new(1, "ping")).await;
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_initialize_then_list() {
        let state = state();
        let init = state.handle_request(initialize_request(1)).await;
        let result = init.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "solana-mcp");

        let list = state
            .handle_request(JsonRpcRequest::new(2, "tools/list"))
            .await;
        let tools = list.result.unwrap();
        assert_eq!(tools["tools"][0]["name"], "getSlot");
        assert_eq!(state.client_info().unwrap().name, "test-client");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let state = state();
        state.handle_request(initialize_request(1)).await;
        let response = state
            .handle_request(JsonRpcRequest::new(2, "bogus/method"))
            .await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_invalid_params() {
        let state = state();
        state.handle_request(initialize_request(1)).await;
        let response = state
            .handle_request(
                JsonRpcRequest::new(2, "tools/call")
                    .with_params(json!({ "name": "missing" })),
            )
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_resources_read_unknown_uri() {
        let state = state();
        state.handle_request(initialize_request(1)).await;
        let response = state
            .handle_request(
                JsonRpcRequest::new(2, "resources/read")
                    .with_params(json!({ "uri": "solana://missing" })),
            )
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32002);
        assert!(error.message.contains("solana://missing"));
    }
}
