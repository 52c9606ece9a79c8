//! Account query tools: balances, account info, program accounts, and
//! byte-offset parsing of account data.

use base64::Engine;
use serde_json::{json, Value};

use super::ToolContext;
use crate::error::{McpError, McpResult};
use crate::protocol::ToolContent;
use crate::registry::{ToolDef, ToolRegistry};
use crate::rpc::{format_sol, validate_pubkey};
use crate::schema::{InputSchema, ParamType};

pub fn register(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getBalance",
        "Get the SOL balance of an account. Reports both SOL and lamports \
         (1 SOL = 10^9 lamports).",
        InputSchema::new().required("publicKey", ParamType::String, "Account address (base58)"),
        move |args| {
            let c = c.clone();
            async move {
                let key = args["publicKey"].as_str().unwrap_or_default().to_string();
                validate_pubkey("publicKey", &key)?;
                c.diag.note(&format!("getBalance {key}")).await;
                let lamports = c.rpc.get_balance(&key).await?;
                Ok(vec![ToolContent::text(format!(
                    "{} SOL ({} lamports)",
                    format_sol(lamports),
                    lamports
                ))])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getAccountInfo",
        "Get raw account info (owner, lamports, base64 data) for an address.",
        InputSchema::new().required("publicKey", ParamType::String, "Account address (base58)"),
        move |args| {
            let c = c.clone();
            async move {
                let key = args["publicKey"].as_str().unwrap_or_default().to_string();
                validate_pubkey("publicKey", &key)?;
                match c.rpc.get_account_info(&key).await? {
                    Some(account) => Ok(vec![ToolContent::json(&account)]),
                    None => Ok(vec![ToolContent::text(format!("Account {key} not found"))]),
                }
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "getProgramAccounts",
        "List all accounts owned by a program, optionally narrowed by \
         memcmp/dataSize filters.",
        InputSchema::new()
            .required("programId", ParamType::String, "Program address (base58)")
            .optional(
                "filters",
                ParamType::Array(Box::new(ParamType::Object(
                    InputSchema::new()
                        .optional("dataSize", ParamType::Number, "Exact account data size")
                        .optional(
                            "memcmp",
                            ParamType::Object(
                                InputSchema::new()
                                    .required("offset", ParamType::Number, "Byte offset")
                                    .required("bytes", ParamType::String, "Base58 bytes to match"),
                            ),
                            "Byte comparison filter",
                        ),
                ))),
                "getProgramAccounts filters",
            ),
        move |args| {
            let c = c.clone();
            async move {
                let program_id = args["programId"].as_str().unwrap_or_default().to_string();
                validate_pubkey("programId", &program_id)?;
                let mut config = json!({ "encoding": "base64" });
                if let Some(filters) = args.get("filters") {
                    config["filters"] = filters.clone();
                }
                let accounts = c
                    .rpc
                    .call("getProgramAccounts", json!([program_id, config]))
                    .await?;
                Ok(vec![ToolContent::json(&accounts)])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "parseAccountData",
        "Fetch an account and render a byte range of its data as hex, utf8, \
         or base64.",
        InputSchema::new()
            .required("publicKey", ParamType::String, "Account address (base58)")
            .required("offset", ParamType::Number, "Start byte offset")
            .required("length", ParamType::Number, "Number of bytes to read")
            .optional_with_default(
                "encoding",
                ParamType::String,
                "Output encoding: hex, utf8, or base64",
                json!("hex"),
            ),
        move |args| {
            let c = c.clone();
            async move {
                let key = args["publicKey"].as_str().unwrap_or_default().to_string();
                validate_pubkey("publicKey", &key)?;
                let offset = args["offset"].as_u64().unwrap_or_default() as usize;
                let length = args["length"].as_u64().unwrap_or_default() as usize;
                let encoding = args["encoding"].as_str().unwrap_or("hex").to_string();

                let account = c
                    .rpc
                    .get_account_info(&key)
                    .await?
                    .ok_or_else(|| McpError::upstream(format!("account {key} not found")))?;
                let data_b64 = account["data"][0]
                    .as_str()
                    .ok_or_else(|| McpError::upstream("account data is not base64"))?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data_b64)
                    .map_err(|e| McpError::upstream(format!("account data decode: {e}")))?;

                let slice = slice_bytes(&bytes, offset, length)?;
                let rendered = render_bytes(slice, &encoding)?;
                Ok(vec![ToolContent::text(format!(
                    "bytes [{offset}..{}) of {key} ({encoding}): {rendered}",
                    offset + length
                ))])
            }
        },
    ))?;

    Ok(())
}

fn slice_bytes(bytes: &[u8], offset: usize, length: usize) -> McpResult<&[u8]> {
    let end = offset
        .checked_add(length)
        .ok_or_else(|| McpError::upstream("offset + length overflows"))?;
    bytes.get(offset..end).ok_or_else(|| {
        McpError::upstream(format!(
            "range [{offset}..{end}) exceeds account data of {} bytes",
            bytes.len()
        ))
    })
}

fn render_bytes(bytes: &[u8], encoding: &str) -> McpResult<String> {
    match encoding {
        "hex" => Ok(hex::encode(bytes)),
        "base64" => Ok(base64::engine::general_purpose::STANDARD.encode(bytes)),
        "utf8" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => Err(McpError::upstream(format!("unsupported encoding: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolRegistry;
    use crate::rpc::MockRpc;
    use crate::tools::testutil::mock_context;
    use std::sync::Arc;

    const KEY: &str = "11111111111111111111111111111111";

    fn registry_with(rpc: Arc<MockRpc>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_get_balance_formats_sol() {
        let rpc = Arc::new(
            MockRpc::new().with_result("getBalance", json!({ "value": 1_000_000_000u64 })),
        );
        let registry = registry_with(rpc);

        let result = registry
            .dispatch("getBalance", json!({ "publicKey": KEY }))
            .await
            .unwrap();
        assert_eq!(result.content[0].as_text(), "1 SOL (1000000000 lamports)");
    }

    #[tokio::test]
    async fn test_get_balance_invalid_key_is_error_content() {
        let rpc = Arc::new(MockRpc::new());
        let registry = registry_with(rpc.clone());

        let result = registry
            .dispatch("getBalance", json!({ "publicKey": "bogus" }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(rpc.call_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_account_data_hex_slice() {
        let data = base64::engine::general_purpose::STANDARD.encode([0xAAu8, 0xBB, 0xCC, 0xDD]);
        let rpc = Arc::new(MockRpc::new().with_result(
            "getAccountInfo",
            json!({ "value": { "data": [data, "base64"], "lamports": 1 } }),
        ));
        let registry = registry_with(rpc);

        let result = registry
            .dispatch(
                "parseAccountData",
                json!({ "publicKey": KEY, "offset": 1, "length": 2 }),
            )
            .await
            .unwrap();
        assert!(result.content[0].as_text().contains("bbcc"));
    }

    #[tokio::test]
    async fn test_parse_account_data_negative_offset_rejected() {
        let rpc = Arc::new(MockRpc::new());
        let registry = registry_with(rpc.clone());

        let err = registry
            .dispatch(
                "parseAccountData",
                json!({ "publicKey": KEY, "offset": -5, "length": 2 }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::Validation { ref path, .. } if path == "offset"));
        assert_eq!(rpc.call_count(), 0, "handler must not run");
    }

    #[tokio::test]
    async fn test_parse_account_data_out_of_range() {
        let data = base64::engine::general_purpose::STANDARD.encode([1u8, 2]);
        let rpc = Arc::new(MockRpc::new().with_result(
            "getAccountInfo",
            json!({ "value": { "data": [data, "base64"] } }),
        ));
        let registry = registry_with(rpc);

        let result = registry
            .dispatch(
                "parseAccountData",
                json!({ "publicKey": KEY, "offset": 0, "length": 16 }),
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result.content[0].as_text().contains("exceeds account data"));
    }

    #[tokio::test]
    async fn test_missing_account_reported_as_text() {
        let rpc =
            Arc::new(MockRpc::new().with_result("getAccountInfo", json!({ "value": null })));
        let registry = registry_with(rpc);

        let result = registry
            .dispatch("getAccountInfo", json!({ "publicKey": KEY }))
            .await
            .unwrap();
        assert!(result.is_error.is_none());
        assert!(result.content[0].as_text().contains("not found"));
    }
}
