//! Anchor IDL tools: fetch, instruction dry-runs, GPA filter and CPI
//! scaffold generation.

use serde_json::{json, Map, Value};

use super::ToolContext;
use crate::error::{McpError, McpResult};
use crate::idl::{
    account_filters, discriminator, find_instruction, map_instruction_accounts,
    map_instruction_args,
};
use crate::protocol::ToolContent;
use crate::registry::{ToolDef, ToolRegistry};
use crate::rpc::validate_pubkey;
use crate::schema::{InputSchema, ParamType};

pub fn register(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    let c = ctx.clone();
    registry.register(ToolDef::new(
        "fetchProgramIdl",
        "Fetch the Anchor IDL for a program, trying the Anchor registry, the \
         derived on-chain IDL account, and a secondary registry in order.",
        InputSchema::new().required("programId", ParamType::String, "Program address (base58)"),
        move |args| {
            let c = c.clone();
            async move {
                let program_id = args["programId"].as_str().unwrap_or_default().to_string();
                validate_pubkey("programId", &program_id)?;
                let client = c.idl_client();
                match client.fetch(&program_id).await? {
                    Some(idl) => Ok(vec![ToolContent::json(&idl)]),
                    None => Ok(vec![ToolContent::text(format!(
                        "IDL not found for program {program_id}"
                    ))]),
                }
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "testProgramIdl",
        "Dry-run an instruction against a program's IDL: map supplied \
         arguments and accounts onto the declaration and show the \
         discriminator-prefixed instruction description.",
        InputSchema::new()
            .required("programId", ParamType::String, "Program address (base58)")
            .required("instruction", ParamType::String, "Declared instruction name")
            .optional(
                "args",
                ParamType::Object(InputSchema::open()),
                "Instruction arguments, keyed by declared name",
            )
            .optional(
                "accounts",
                ParamType::Array(Box::new(ParamType::String)),
                "Account addresses in declaration order (base58)",
            ),
        move |args| {
            let c = c.clone();
            async move {
                let program_id = args["programId"].as_str().unwrap_or_default().to_string();
                validate_pubkey("programId", &program_id)?;
                let name = args["instruction"].as_str().unwrap_or_default().to_string();

                let client = c.idl_client();
                let idl = client.fetch(&program_id).await?.ok_or_else(|| {
                    McpError::upstream(format!("IDL not found for program {program_id}"))
                })?;
                let instruction = find_instruction(&idl, &name)?;

                let empty = Map::new();
                let supplied_args = args
                    .get("args")
                    .and_then(|v| v.as_object())
                    .unwrap_or(&empty);
                let mapped_args = map_instruction_args(instruction, supplied_args)?;
                let supplied_accounts = args.get("accounts").and_then(|v| v.as_array());
                let mapped_accounts =
                    map_instruction_accounts(instruction, supplied_accounts)?;

                let disc = discriminator("global", &name);
                Ok(vec![ToolContent::json(&json!({
                    "programId": program_id,
                    "instruction": name,
                    "discriminator": hex::encode(disc),
                    "args": mapped_args,
                    "accounts": mapped_accounts,
                }))])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "createGPAFilters",
        "Build getProgramAccounts memcmp filters from an IDL account layout: \
         the account discriminator at offset 0 plus one filter per requested \
         field value.",
        InputSchema::new()
            .required("programId", ParamType::String, "Program address (base58)")
            .required("accountType", ParamType::String, "Declared account type name")
            .optional(
                "fields",
                ParamType::Object(InputSchema::open()),
                "Field values to filter on, keyed by declared name",
            ),
        move |args| {
            let c = c.clone();
            async move {
                let program_id = args["programId"].as_str().unwrap_or_default().to_string();
                validate_pubkey("programId", &program_id)?;
                let account_type = args["accountType"].as_str().unwrap_or_default();

                let client = c.idl_client();
                let idl = client.fetch(&program_id).await?.ok_or_else(|| {
                    McpError::upstream(format!("IDL not found for program {program_id}"))
                })?;

                let empty = Map::new();
                let fields = args
                    .get("fields")
                    .and_then(|v| v.as_object())
                    .unwrap_or(&empty);
                let filters = account_filters(&idl, account_type, fields)?;
                Ok(vec![ToolContent::json(&json!({ "filters": filters }))])
            }
        },
    ))?;

    let c = ctx.clone();
    registry.register(ToolDef::new(
        "createCPI",
        "Render a cross-program invocation scaffold for an IDL instruction: \
         account metas plus discriminator-prefixed argument layout.",
        InputSchema::new()
            .required("programId", ParamType::String, "Program address (base58)")
            .required("instruction", ParamType::String, "Declared instruction name")
            .optional(
                "args",
                ParamType::Object(InputSchema::open()),
                "Instruction arguments, keyed by declared name",
            ),
        move |args| {
            let c = c.clone();
            async move {
                let program_id = args["programId"].as_str().unwrap_or_default().to_string();
                validate_pubkey("programId", &program_id)?;
                let name = args["instruction"].as_str().unwrap_or_default().to_string();

                let client = c.idl_client();
                let idl = client.fetch(&program_id).await?.ok_or_else(|| {
                    McpError::upstream(format!("IDL not found for program {program_id}"))
                })?;
                let instruction = find_instruction(&idl, &name)?;

                let empty = Map::new();
                let supplied_args = args
                    .get("args")
                    .and_then(|v| v.as_object())
                    .unwrap_or(&empty);
                let mapped_args = map_instruction_args(instruction, supplied_args)?;
                let account_metas = map_instruction_accounts(instruction, None)?;

                let disc = discriminator("global", &name);
                Ok(vec![ToolContent::json(&json!({
                    "cpi": {
                        "programId": program_id,
                        "instruction": name,
                        "data": {
                            "discriminator": hex::encode(disc),
                            "args": mapped_args,
                        },
                        "accounts": account_metas,
                    }
                }))])
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
    use base64::Engine;
    use std::sync::Arc;

    const PROGRAM: &str = "11111111111111111111111111111111";

    /// Mock where the registries are unreachable but the derived on-chain
    /// IDL account holds a base64 JSON IDL.
    fn rpc_with_onchain_idl(idl: &Value) -> Arc<MockRpc> {
        let data = base64::engine::general_purpose::STANDARD
            .encode(serde_json::to_vec(idl).unwrap());
        Arc::new(MockRpc::new().with_result(
            "getAccountInfo",
            json!({ "value": { "data": [data, "base64"], "lamports": 1 } }),
        ))
    }

    fn sample_idl() -> Value {
        json!({
            "name": "counter",
            "instructions": [{
                "name": "increment",
                "accounts": [
                    { "name": "counter", "isMut": true, "isSigner": false }
                ],
                "args": [
                    { "name": "amount", "type": "u64" }
                ]
            }],
            "accounts": [{
                "name": "Counter",
                "type": { "kind": "struct", "fields": [
                    { "name": "count", "type": "u64" }
                ]}
            }]
        })
    }

    #[tokio::test]
    async fn test_fetch_all_misses_is_plain_text() {
        // No on-chain account, registries unreachable from tests.
        let rpc = Arc::new(MockRpc::new().with_result("getAccountInfo", json!({ "value": null })));
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry
            .dispatch("fetchProgramIdl", json!({ "programId": PROGRAM }))
            .await
            .unwrap();
        assert!(result.is_error.is_none());
        assert_eq!(
            result.content[0].as_text(),
            format!("IDL not found for program {PROGRAM}")
        );
    }

    #[tokio::test]
    async fn test_test_program_idl_arg_count_mismatch() {
        let rpc = rpc_with_onchain_idl(&sample_idl());
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry
            .dispatch(
                "testProgramIdl",
                json!({
                    "programId": PROGRAM,
                    "instruction": "increment",
                    "args": {}
                }),
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result.content[0]
            .as_text()
            .contains("1 argument(s), 0 supplied"));
    }

    #[tokio::test]
    async fn test_create_gpa_filters_from_onchain_idl() {
        let rpc = rpc_with_onchain_idl(&sample_idl());
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry
            .dispatch(
                "createGPAFilters",
                json!({
                    "programId": PROGRAM,
                    "accountType": "Counter",
                    "fields": { "count": 7 }
                }),
            )
            .await
            .unwrap();
        assert!(result.is_error.is_none());
        let parsed: Value = serde_json::from_str(result.content[0].as_text()).unwrap();
        assert_eq!(parsed["filters"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["filters"][1]["memcmp"]["offset"], 8);
    }

    #[tokio::test]
    async fn test_create_cpi_includes_discriminator() {
        let rpc = rpc_with_onchain_idl(&sample_idl());
        let mut registry = ToolRegistry::new();
        register(&mut registry, &mock_context(rpc)).unwrap();

        let result = registry
            .dispatch(
                "createCPI",
                json!({
                    "programId": PROGRAM,
                    "instruction": "increment",
                    "args": { "amount": 3 }
                }),
            )
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(result.content[0].as_text()).unwrap();
        let disc = parsed["cpi"]["data"]["discriminator"].as_str().unwrap();
        assert_eq!(disc.len(), 16);
        assert_eq!(parsed["cpi"]["data"]["args"][0]["value"], 3);
    }
}
