//! Anchor IDL fetching and instruction marshaling
//!
//! IDLs are externally published interface descriptions; this module fetches
//! them from fallback sources in a fixed priority order and maps caller JSON
//! onto declared instruction arguments using a small fixed type table.

use std::sync::Arc;

use base64::Engine;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{McpError, McpResult};
use crate::rpc::{validate_pubkey, SolanaRpc};

/// Primary IDL registry (Anchor Program Registry).
pub const PRIMARY_REGISTRY: &str = "https://api.apr.dev/api/v0/program";

/// Secondary registry consulted after the on-chain lookup.
pub const SECONDARY_REGISTRY: &str =
    "https://raw.githubusercontent.com/anchor-registry/idls/main";

/// Fetches IDLs with the fallback chain:
/// primary registry → derived on-chain IDL account → secondary registry.
///
/// Registry base URLs are injected so tests can point them at unroutable
/// addresses instead of the live services.
pub struct IdlClient {
    http: reqwest::Client,
    rpc: Arc<dyn SolanaRpc>,
    primary_registry: String,
    secondary_registry: String,
}

impl IdlClient {
    pub fn new(http: reqwest::Client, rpc: Arc<dyn SolanaRpc>) -> Self {
        Self::with_registries(http, rpc, PRIMARY_REGISTRY, SECONDARY_REGISTRY)
    }

    pub fn with_registries(
        http: reqwest::Client,
        rpc: Arc<dyn SolanaRpc>,
        primary_registry: impl Into<String>,
        secondary_registry: impl Into<String>,
    ) -> Self {
        Self {
            http,
            rpc,
            primary_registry: primary_registry.into(),
            secondary_registry: secondary_registry.into(),
        }
    }

    /// Fetch the IDL for a program. `Ok(None)` means every source missed;
    /// callers report "not found" rather than failing.
    pub async fn fetch(&self, program_id: &str) -> McpResult<Option<Value>> {
        if let Some(idl) = self
            .fetch_registry(&self.primary_registry, program_id)
            .await
        {
            debug!("IDL for {} from primary registry", program_id);
            return Ok(Some(idl));
        }
        if let Some(idl) = self.fetch_onchain(program_id).await? {
            debug!("IDL for {} from derived account", program_id);
            return Ok(Some(idl));
        }
        if let Some(idl) = self
            .fetch_registry(&self.secondary_registry, program_id)
            .await
        {
            debug!("IDL for {} from secondary registry", program_id);
            return Ok(Some(idl));
        }
        Ok(None)
    }

    /// One registry lookup; any failure is treated as a miss so the chain
    /// falls through to the next source.
    async fn fetch_registry(&self, base: &str, program_id: &str) -> Option<Value> {
        let url = format!("{base}/{program_id}/idl.json");
        let response = self.http.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<Value>().await.ok()
    }

    /// Read the derived IDL account on-chain. The account data is
    /// base64-encoded UTF-8 JSON per the collaborator contract.
    async fn fetch_onchain(&self, program_id: &str) -> McpResult<Option<Value>> {
        let address = derived_idl_address(program_id)?;
        let Some(account) = self.rpc.get_account_info(&address).await.ok().flatten() else {
            return Ok(None);
        };
        let Some(data_b64) = account["data"][0].as_str() else {
            return Ok(None);
        };
        let bytes = match base64::engine::general_purpose::STANDARD.decode(data_b64) {
            Ok(b) => b,
            Err(_) => return Ok(None),
        };
        Ok(serde_json::from_slice(&bytes).ok())
    }
}

/// Deterministic address of a program's IDL account:
/// base58(sha256("anchor:idl" || program id bytes)).
pub fn derived_idl_address(program_id: &str) -> McpResult<String> {
    let program_bytes = bs58::decode(program_id)
        .into_vec()
        .map_err(|_| McpError::validation("programId", "not valid base58"))?;
    let mut hasher = Sha256::new();
    hasher.update(b"anchor:idl");
    hasher.update(&program_bytes);
    Ok(bs58::encode(hasher.finalize()).into_string())
}

/// First 8 bytes of sha256("<namespace>:<name>"), the Anchor discriminator.
pub fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Look up a declared instruction in the IDL.
pub fn find_instruction<'a>(idl: &'a Value, name: &str) -> McpResult<&'a Value> {
    idl["instructions"]
        .as_array()
        .and_then(|list| list.iter().find(|i| i["name"] == name))
        .ok_or_else(|| {
            McpError::upstream(format!("instruction `{name}` not declared in IDL"))
        })
}

/// Map caller-supplied JSON onto the instruction's declared arguments.
///
/// The type table is fixed: 64-bit integers, public keys, and passthrough
/// for everything else. Counts are checked against the declaration; the
/// upstream implementation skipped this check, which looked like a latent
/// bug, so mismatches are surfaced as errors here.
pub fn map_instruction_args(
    instruction: &Value,
    supplied: &Map<String, Value>,
) -> McpResult<Vec<Value>> {
    let declared = instruction["args"].as_array().cloned().unwrap_or_default();

    if supplied.len() != declared.len() {
        return Err(McpError::upstream(format!(
            "instruction declares {} argument(s), {} supplied",
            declared.len(),
            supplied.len()
        )));
    }

    let mut mapped = Vec::with_capacity(declared.len());
    for arg in &declared {
        let name = arg["name"].as_str().unwrap_or_default();
        let value = supplied
            .get(name)
            .ok_or_else(|| McpError::upstream(format!("missing argument `{name}`")))?;

        let ty = arg["type"].as_str().unwrap_or("");
        let coerced = match ty {
            "u64" | "i64" | "u32" | "i32" | "u16" | "i16" | "u8" | "i8" => {
                let n = value
                    .as_i64()
                    .map(Value::from)
                    .or_else(|| value.as_u64().map(Value::from))
                    .or_else(|| value.as_str().and_then(|s| s.parse::<u64>().ok()).map(Value::from))
                    .ok_or_else(|| {
                        McpError::upstream(format!("argument `{name}` is not an integer"))
                    })?;
                n
            }
            "publicKey" | "pubkey" => {
                let s = value.as_str().ok_or_else(|| {
                    McpError::upstream(format!("argument `{name}` is not a public key string"))
                })?;
                validate_pubkey(name, s)
                    .map_err(|e| McpError::upstream(e.to_string()))?;
                value.clone()
            }
            _ => value.clone(),
        };
        mapped.push(json!({ "name": name, "type": ty, "value": coerced }));
    }
    Ok(mapped)
}

/// Declared account metas for an instruction, checked against any
/// caller-supplied account list.
pub fn map_instruction_accounts(
    instruction: &Value,
    supplied: Option<&Vec<Value>>,
) -> McpResult<Vec<Value>> {
    let declared = instruction["accounts"].as_array().cloned().unwrap_or_default();

    if let Some(supplied) = supplied {
        if supplied.len() != declared.len() {
            return Err(McpError::upstream(format!(
                "instruction declares {} account(s), {} supplied",
                declared.len(),
                supplied.len()
            )));
        }
        for (i, addr) in supplied.iter().enumerate() {
            let s = addr
                .as_str()
                .ok_or_else(|| McpError::upstream(format!("account {i} is not a string")))?;
            validate_pubkey(&format!("accounts.{i}"), s)
                .map_err(|e| McpError::upstream(e.to_string()))?;
        }
        return Ok(declared
            .iter()
            .zip(supplied)
            .map(|(meta, addr)| {
                json!({
                    "name": meta["name"],
                    "pubkey": addr,
                    "isMut": meta["isMut"],
                    "isSigner": meta["isSigner"],
                })
            })
            .collect());
    }

    Ok(declared)
}

/// Fixed byte size of an IDL field type, where known. Layout walking stops
/// at the first variable-size field.
fn field_size(ty: &Value) -> Option<usize> {
    match ty.as_str() {
        Some("bool") | Some("u8") | Some("i8") => Some(1),
        Some("u16") | Some("i16") => Some(2),
        Some("u32") | Some("i32") | Some("f32") => Some(4),
        Some("u64") | Some("i64") | Some("f64") => Some(8),
        Some("u128") | Some("i128") => Some(16),
        Some("publicKey") | Some("pubkey") => Some(32),
        _ => None,
    }
}

/// Build `getProgramAccounts` filters from an IDL account layout: an
/// 8-byte discriminator memcmp at offset 0, plus one memcmp per requested
/// field value at its computed offset.
pub fn account_filters(
    idl: &Value,
    account_type: &str,
    field_values: &Map<String, Value>,
) -> McpResult<Vec<Value>> {
    let account = idl["accounts"]
        .as_array()
        .and_then(|list| list.iter().find(|a| a["name"] == account_type))
        .ok_or_else(|| {
            McpError::upstream(format!("account type `{account_type}` not declared in IDL"))
        })?;

    let disc = discriminator("account", account_type);
    let mut filters = vec![json!({
        "memcmp": { "offset": 0, "bytes": bs58::encode(disc).into_string() }
    })];

    let fields = account["type"]["fields"].as_array().cloned().unwrap_or_default();

    for (name, value) in field_values {
        let mut offset = 8usize; // past the discriminator
        let mut found = None;
        for field in &fields {
            if field["name"] == name.as_str() {
                found = Some(field.clone());
                break;
            }
            match field_size(&field["type"]) {
                Some(size) => offset += size,
                None => {
                    return Err(McpError::upstream(format!(
                        "field `{name}` sits past a variable-size field; offset unknown"
                    )))
                }
            }
        }
        let field = found.ok_or_else(|| {
            McpError::upstream(format!(
                "field `{name}` not declared on account `{account_type}`"
            ))
        })?;

        let bytes = encode_field_bytes(&field["type"], value)?;
        filters.push(json!({
            "memcmp": { "offset": offset, "bytes": bs58::encode(bytes).into_string() }
        }));
    }

    Ok(filters)
}

/// Encode a field value as the little-endian / raw bytes memcmp expects.
fn encode_field_bytes(ty: &Value, value: &Value) -> McpResult<Vec<u8>> {
    match ty.as_str() {
        Some("publicKey") | Some("pubkey") => {
            let s = value
                .as_str()
                .ok_or_else(|| McpError::upstream("public key field needs a string value"))?;
            bs58::decode(s)
                .into_vec()
                .map_err(|_| McpError::upstream("public key value is not valid base58"))
        }
        Some("u64") | Some("i64") => {
            let n = value
                .as_u64()
                .ok_or_else(|| McpError::upstream("integer field needs a number value"))?;
            Ok(n.to_le_bytes().to_vec())
        }
        Some("u32") | Some("i32") => {
            let n = value
                .as_u64()
                .ok_or_else(|| McpError::upstream("integer field needs a number value"))?;
            Ok((n as u32).to_le_bytes().to_vec())
        }
        Some("u8") | Some("i8") | Some("bool") => {
            let n = value
                .as_u64()
                .or_else(|| value.as_bool().map(u64::from))
                .ok_or_else(|| McpError::upstream("byte field needs a number or boolean"))?;
            Ok(vec![n as u8])
        }
        _ => Err(McpError::upstream(
            "only integer, boolean, and public key fields can be filtered",
        )),
    }
}
