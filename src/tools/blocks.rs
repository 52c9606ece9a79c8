//! Chain state tools: slots, blocks, epochs, blockhashes, node status.

use serde_json::{json, Value};

use super::ToolContext;
use crate::error::McpResult;
use crate::protocol::ToolContent;
use crate::registry::{ToolDef, ToolRegistry};
use crate::schema::{InputSchema, ParamType};

pub fn register(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getSlot",
        "Get the current slot.",
        InputSchema::new(),
        move |_args| {
            let c = c.clone();
            async move {
                let slot = c.rpc.get_slot().await?;
                Ok(vec![ToolContent::text(format!("Current slot: {slot}"))])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getBlock",
        "Get a confirmed block by slot number.",
        InputSchema::new().required("slot", ParamType::Number, "Block slot number"),
        move |args| {
            let c = c.clone();
            async move {
                let slot = args["slot"].as_u64().unwrap_or_default();
                let block = c
                    .rpc
                    .call(
                        "getBlock",
                        json!([slot, { "maxSupportedTransactionVersion": 0 }]),
                    )
                    .await?;
                Ok(vec![ToolContent::json(&block)])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getEpochInfo",
        "Get information about the current epoch.",
        InputSchema::new(),
        move |_args| {
            let c = c.clone();
            async move {
                let info = c.rpc.call("getEpochInfo", Value::Null).await?;
                Ok(vec![ToolContent::json(&info)])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getLatestBlockhash",
        "Get the latest blockhash and its last valid block height.",
        InputSchema::new(),
        move |_args| {
            let c = c.clone();
            async move {
                let result = c.rpc.call("getLatestBlockhash", Value::Null).await?;
                Ok(vec![ToolContent::json(&result["value"])])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getHealth",
        "Get the health of the RPC node.",
        InputSchema::new(),
        move |_args| {
            let c = c.clone();
            async move {
                let health = c.rpc.call("getHealth", Value::Null).await?;
                let text = health.as_str().unwrap_or("ok").to_string();
                Ok(vec![ToolContent::text(text)])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getVersion",
        "Get the software version of the RPC node.",
        InputSchema::new(),
        move |_args| {
            let c = c.clone();
            async move {
                let version = c.rpc.call("getVersion", Value::Null).await?;
                Ok(vec![ToolContent::json(&version)])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getMinimumBalanceForRentExemption",
        "Get the minimum lamport balance required to make an account of the \
         given size rent exempt.",
        InputSchema::new().required("dataSize", ParamType::Number, "Account data size in bytes"),
        move |args| {
            let c = c.clone();
            async move {
                let size = args["dataSize"].as_u64().unwrap_or_default();
                let lamports = c
                    .rpc
                    .call("getMinimumBalanceForRentExemption", json!([size]))
                    .await?;
                Ok(vec![ToolContent::text(format!(
                    "{} lamports for {} bytes",
                    lamports, size
                ))])
            }
        },
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::MockRpc;
    use crate::tools::testutil::mock_context;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_slot_text() {
        let rpc = Arc::new(MockRpc::new().with_result("getSlot", json!(250_000_000u64)));
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry.dispatch("getSlot", Value::Null).await.unwrap();
        assert_eq!(result.content[0].as_text(), "Current slot: 250000000");
    }

    #[tokio::test]
    async fn test_get_health_error_is_content() {
        let rpc = Arc::new(MockRpc::new().with_error("getHealth", "node is behind"));
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry.dispatch("getHealth", Value::Null).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content[0].as_text(), "Error: node is behind");
    }

    #[tokio::test]
    async fn test_get_block_requires_slot() {
        let rpc = Arc::new(MockRpc::new());
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc.clone())).unwrap();

        let err = registry.dispatch("getBlock", json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::McpError::Validation { ref path, .. } if path == "slot"
        ));
        assert_eq!(rpc.call_count(), 0);
    }
}
