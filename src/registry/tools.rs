//! Tool registry: registration, validation, dispatch

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{McpError, McpResult};
use crate::protocol::{Tool, ToolContent, ToolsCallResult};
use crate::schema::InputSchema;

type BoxHandler =
    Box<dyn Fn(Map<String, Value>) -> BoxFuture<'static, McpResult<Vec<ToolContent>>> + Send + Sync>;

/// A registered tool: unique name, description, typed input schema, and an
/// async handler that only ever sees validated arguments.
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub schema: InputSchema,
    handler: BoxHandler,
}

impl ToolDef {
    pub fn new<F, Fut>(name: &str, description: &str, schema: InputSchema, handler: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = McpResult<Vec<ToolContent>>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
            handler: Box::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, tool: ToolDef) -> McpResult<()> {
        if self.index.contains_key(&tool.name) {
            return Err(McpError::DuplicateName(tool.name));
        }
        self.index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Tool definitions in registration order, for `tools/list`.
    pub fn list(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| Tool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.schema.to_json_schema(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call.
    ///
    /// `UnknownTool` and `Validation` fail before the handler runs and
    /// surface on the protocol error channel. Anything the handler itself
    /// raises is caught here and folded into an error-flagged Result, so
    /// business-logic failures never become transport faults.
    pub async fn dispatch(&self, name: &str, raw_args: Value) -> McpResult<ToolsCallResult> {
        let tool = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        let args = tool.schema.validate(raw_args)?;

        debug!("dispatching tool: {}", name);

        match (tool.handler)(args).await {
            Ok(content) => Ok(ToolsCallResult::success(content)),
            Err(e) => Ok(ToolsCallResult::error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamType;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn echo_tool(counter: Arc<AtomicU64>) -> ToolDef {
        ToolDef::new(
            "echo",
            "Echo the message back",
            InputSchema::new().required("message", ParamType::String, "Message to echo"),
            move |args| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::Relaxed);
                    let message = args["message"].as_str().unwrap_or_default().to_string();
                    Ok(vec![ToolContent::text(message)])
                }
            },
        )
    }

    #[tokio::test]
    async fn test_register_and_dispatch() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut reg = ToolRegistry::new();
        reg.register(echo_tool(counter.clone())).unwrap();

        let result = reg
            .dispatch("echo", serde_json::json!({ "message": "hi" }))
            .await
            .unwrap();
        assert_eq!(result.content[0].as_text(), "hi");
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut reg = ToolRegistry::new();
        reg.register(echo_tool(counter.clone())).unwrap();
        let err = reg.register(echo_tool(counter)).unwrap_err();
        assert!(matches!(err, McpError::DuplicateName(name) if name == "echo"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let reg = ToolRegistry::new();
        let err = reg
            .dispatch("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::UnknownTool(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_validation_failure_skips_handler() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut reg = ToolRegistry::new();
        reg.register(echo_tool(counter.clone())).unwrap();

        let err = reg.dispatch("echo", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::Validation { ref path, .. } if path == "message"));
        assert_eq!(counter.load(Ordering::Relaxed), 0, "handler must not run");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_content() {
        let mut reg = ToolRegistry::new();
        reg.register(ToolDef::new(
            "fails",
            "Always fails upstream",
            InputSchema::new(),
            |_args| async { Err(McpError::upstream("not found")) },
        ))
        .unwrap();

        let result = reg.dispatch("fails", Value::Null).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content[0].as_text(), "Error: not found");
    }

    #[tokio::test]
    async fn test_list_preserves_registration_order() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut reg = ToolRegistry::new();
        reg.register(echo_tool(counter)).unwrap();
        reg.register(ToolDef::new(
            "second",
            "Second tool",
            InputSchema::new(),
            |_| async { Ok(vec![]) },
        ))
        .unwrap();

        let listed = reg.list();
        assert_eq!(listed[0].name, "echo");
        assert_eq!(listed[1].name, "second");
    }
}
