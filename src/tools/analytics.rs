//! Analytics tools backed by third-party APIs: Dune queries and the
//! Helius DAS asset index. Both need API keys from the environment; a
//! missing key is reported as error content naming the variable.

use serde_json::{json, Value};

use super::ToolContext;
use crate::error::{McpError, McpResult};
use crate::protocol::ToolContent;
use crate::registry::{ToolDef, ToolRegistry};
use crate::rpc::validate_pubkey;
use crate::schema::{InputSchema, ParamType};

const DUNE_API_BASE: &str = "https://api.dune.com/api/v1";
const HELIUS_RPC_BASE: &str = "https://mainnet.helius-rpc.com";

pub fn register(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getDuneQueryResults",
        "Fetch the latest results of a saved Dune Analytics query. Requires \
         DUNE_API_KEY.",
        InputSchema::new().required("queryId", ParamType::Number, "Dune query id"),
        move |args| {
            let c = c.clone();
            async move {
                let key = c.config.dune_api_key.clone().ok_or_else(|| {
                    McpError::upstream("DUNE_API_KEY is not configured")
                })?;
                let query_id = args["queryId"].as_u64().unwrap_or_default();
                let url = format!("{DUNE_API_BASE}/query/{query_id}/results");
                let response = c
                    .http
                    .get(&url)
                    .header("X-Dune-API-Key", key)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(McpError::upstream(format!(
                        "Dune API returned {}",
                        response.status()
                    )));
                }
                let body: Value = response.json().await?;
                Ok(vec![ToolContent::json(&body["result"])])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getAssetsByOwner",
        "List digital assets owned by a wallet via the Helius DAS API. \
         Requires HELIUS_API_KEY.",
        InputSchema::new().required("owner", ParamType::String, "Owner wallet address (base58)"),
        move |args| {
            let c = c.clone();
            async move {
                let key = c.config.helius_api_key.clone().ok_or_else(|| {
                    McpError::upstream("HELIUS_API_KEY is not configured")
                })?;
                let owner = args["owner"].as_str().unwrap_or_default().to_string();
                validate_pubkey("owner", &owner)?;
                let url = format!("{HELIUS_RPC_BASE}/?api-key={key}");
                let response = c
                    .http
                    .post(&url)
                    .json(&json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "method": "getAssetsByOwner",
                        "params": { "ownerAddress": owner, "page": 1, "limit": 100 }
                    }))
                    .send()
                    .await?;
                let body: Value = response.json().await?;
                if let Some(error) = body.get("error") {
                    return Err(McpError::upstream(format!(
                        "Helius error: {}",
                        error["message"].as_str().unwrap_or("unknown")
                    )));
                }
                Ok(vec![ToolContent::json(&body["result"])])
            }
        },
    ))?;

    Ok(())
}
