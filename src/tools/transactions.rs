//! Transaction tools: lookup, simulation, and submission.

use serde_json::json;

use super::ToolContext;
use crate::error::McpResult;
use crate::protocol::ToolContent;
use crate::registry::{ToolDef, ToolRegistry};
use crate::schema::{InputSchema, ParamType};

pub fn register(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getTransaction",
        "Get a confirmed transaction by signature.",
        InputSchema::new().required(
            "signature",
            ParamType::String,
            "Transaction signature (base58)",
        ),
        move |args| {
            let c = c.clone();
            async move {
                let signature = args["signature"].as_str().unwrap_or_default().to_string();
                let tx = c
                    .rpc
                    .call(
                        "getTransaction",
                        json!([
                            signature,
                            { "encoding": "json", "maxSupportedTransactionVersion": 0 }
                        ]),
                    )
                    .await?;
                Ok(vec![ToolContent::json(&tx)])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "simulateTransaction",
        "Simulate a base64-encoded transaction without submitting it.",
        InputSchema::new().required(
            "transaction",
            ParamType::String,
            "Serialized transaction (base64)",
        ),
        move |args| {
            let c = c.clone();
            async move {
                let tx = args["transaction"].as_str().unwrap_or_default().to_string();
                let result = c
                    .rpc
                    .call(
                        "simulateTransaction",
                        json!([tx, { "encoding": "base64" }]),
                    )
                    .await?;
                Ok(vec![ToolContent::json(&result["value"])])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "sendTransaction",
        "Submit a signed, base64-encoded transaction to the cluster.",
        InputSchema::new().required(
            "transaction",
            ParamType::String,
            "Signed serialized transaction (base64)",
        ),
        move |args| {
            let c = c.clone();
            async move {
                let tx = args["transaction"].as_str().unwrap_or_default().to_string();
                c.diag.note("sendTransaction").await;
                let signature = c
                    .rpc
                    .call("sendTransaction", json!([tx, { "encoding": "base64" }]))
                    .await?;
                let text = signature
                    .as_str()
                    .map(|s| format!("Transaction submitted: {s}"))
                    .unwrap_or_else(|| signature.to_string());
                Ok(vec![ToolContent::text(text)])
            }
        },
    ))?;

    Ok(())
}
