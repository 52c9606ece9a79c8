//! SPL token tools

use serde_json::json;

use super::ToolContext;
use crate::error::{McpError, McpResult};
use crate::protocol::ToolContent;
use crate::registry::{ToolDef, ToolRegistry};
use crate::rpc::validate_pubkey;
use crate::schema::{InputSchema, ParamType};

/// SPL Token program id, used as the default owner-query filter.
const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

pub fn register(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getTokenSupply",
        "Get the total supply of an SPL token mint.",
        InputSchema::new().required("mint", ParamType::String, "Token mint address (base58)"),
        move |args| {
            let c = c.clone();
            async move {
                let mint = args["mint"].as_str().unwrap_or_default().to_string();
                validate_pubkey("mint", &mint)?;
                let supply = c.rpc.call("getTokenSupply", json!([mint])).await?;
                Ok(vec![ToolContent::json(&supply["value"])])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getTokenAccountsByOwner",
        "List all SPL token accounts owned by a wallet address.",
        InputSchema::new().required("owner", ParamType::String, "Owner wallet address (base58)"),
        move |args| {
            let c = c.clone();
            async move {
                let owner = args["owner"].as_str().unwrap_or_default().to_string();
                validate_pubkey("owner", &owner)?;
                let accounts = c
                    .rpc
                    .call(
                        "getTokenAccountsByOwner",
                        json!([
                            owner,
                            { "programId": TOKEN_PROGRAM_ID },
                            { "encoding": "jsonParsed" }
                        ]),
                    )
                    .await?;
                Ok(vec![ToolContent::json(&accounts["value"])])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getTokenBalance",
        "Get the token balance of a specific token account.",
        InputSchema::new().required(
            "tokenAccount",
            ParamType::String,
            "Token account address (base58)",
        ),
        move |args| {
            let c = c.clone();
            async move {
                let account = args["tokenAccount"].as_str().unwrap_or_default().to_string();
                validate_pubkey("tokenAccount", &account)?;
                let balance = c
                    .rpc
                    .call("getTokenAccountBalance", json!([account]))
                    .await?;
                let value = &balance["value"];
                let amount = value["uiAmountString"]
                    .as_str()
                    .or_else(|| value["amount"].as_str())
                    .ok_or_else(|| McpError::upstream("token balance carried no amount"))?;
                Ok(vec![ToolContent::text(format!("Token balance: {amount}"))])
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

    const KEY: &str = "11111111111111111111111111111111";

    #[tokio::test]
    async fn test_token_balance_prefers_ui_amount() {
        let rpc = Arc::new(MockRpc::new().with_result(
            "getTokenAccountBalance",
            json!({ "value": { "amount": "1500000", "uiAmountString": "1.5", "decimals": 6 } }),
        ));
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry
            .dispatch("getTokenBalance", json!({ "tokenAccount": KEY }))
            .await
            .unwrap();
        assert_eq!(result.content[0].as_text(), "Token balance: 1.5");
    }

    #[tokio::test]
    async fn test_token_supply_unwraps_value() {
        let rpc = Arc::new(MockRpc::new().with_result(
            "getTokenSupply",
            json!({ "value": { "amount": "1000000000", "decimals": 9 } }),
        ));
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry
            .dispatch("getTokenSupply", json!({ "mint": KEY }))
            .await
            .unwrap();
        assert!(result.content[0].as_text().contains("1000000000"));
    }
}
