//! Built-in documentation and cluster resources.
//!
//! Doc resources proxy one remote fetch each; the cluster resource makes a
//! single RPC call. Failures surface as `Error: <message>` content through
//! the registry, never as transport faults.

use serde_json::{json, Value};

use crate::error::{McpError, McpResult};
use crate::protocol::{Resource, ResourceContent};
use crate::registry::{ResourceDef, ResourceRegistry};
use crate::tools::ToolContext;

const JSON_RPC_DOCS_URL: &str =
    "https://raw.githubusercontent.com/solana-foundation/developer-content/main/docs/rpc.md";
const ANCHOR_IDL_DOCS_URL: &str =
    "https://raw.githubusercontent.com/coral-xyz/anchor/master/docs/src/pages/docs/idl.md";

pub fn register_all(registry: &mut ResourceRegistry, ctx: &ToolContext) -> McpResult<()> {
    registry.register(doc_resource(
        ctx,
        "solana://docs/json-rpc",
        "Solana JSON-RPC API reference",
        JSON_RPC_DOCS_URL,
    ))?;
    registry.register(doc_resource(
        ctx,
        "solana://docs/anchor-idl",
        "Anchor IDL format reference",
        ANCHOR_IDL_DOCS_URL,
    ))?;

    let c = ctx.clone();
    registry.register(ResourceDef::new(
        Resource {
            uri: "solana://cluster/info".to_string(),
            name: "Cluster info".to_string(),
            description: Some("RPC endpoint and node version of the configured cluster".to_string()),
            mime_type: Some("application/json".to_string()),
        },
        move || {
            let c = c.clone();
            async move {
                let version = c.rpc.call("getVersion", Value::Null).await?;
                let info = json!({
                    "rpcUrl": c.config.rpc_url,
                    "version": version,
                });
                Ok(vec![ResourceContent {
                    uri: "solana://cluster/info".to_string(),
                    mime_type: Some("application/json".to_string()),
                    text: Some(serde_json::to_string_pretty(&info)?),
                }])
            }
        },
    ))?;

    Ok(())
}

/// A resource that proxies one remote markdown document.
fn doc_resource(ctx: &ToolContext, uri: &str, name: &str, url: &str) -> ResourceDef {
    let http = ctx.http.clone();
    let uri_owned = uri.to_string();
    let url = url.to_string();
    ResourceDef::new(
        Resource {
            uri: uri.to_string(),
            name: name.to_string(),
            description: None,
            mime_type: Some("text/markdown".to_string()),
        },
        move || {
            let http = http.clone();
            let uri = uri_owned.clone();
            let url = url.clone();
            async move {
                let response = http.get(&url).send().await?;
                if !response.status().is_success() {
                    return Err(McpError::upstream(format!(
                        "doc fetch returned {}",
                        response.status()
                    )));
                }
                let body = response.text().await?;
                Ok(vec![ResourceContent {
                    uri,
                    mime_type: Some("text/markdown".to_string()),
                    text: Some(body),
                }])
            }
        },
    )
}
