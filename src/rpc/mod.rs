//! Solana JSON-RPC collaborator
//!
//! The server talks to the blockchain through the [`SolanaRpc`] trait so
//! tests (and `--mock` mode) can substitute canned responses. Only the raw
//! `call` is required; typed accessors are default methods layered on it.
//!
//! No retries and no timeouts anywhere: every network failure is surfaced
//! once, directly, and a hung call hangs only its own dispatch.

mod http;
mod mock;

pub use http::HttpRpc;
pub use mock::MockRpc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{McpError, McpResult};

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Issue a single JSON-RPC call, returning the `result` member.
    async fn call(&self, method: &str, params: Value) -> McpResult<Value>;

    /// Lamport balance for an account.
    async fn get_balance(&self, address: &str) -> McpResult<u64> {
        let result = self
            .call("getBalance", serde_json::json!([address]))
            .await?;
        result["value"]
            .as_u64()
            .ok_or_else(|| McpError::upstream("getBalance returned no value"))
    }

    /// Current slot.
    async fn get_slot(&self) -> McpResult<u64> {
        let result = self.call("getSlot", Value::Null).await?;
        result
            .as_u64()
            .ok_or_else(|| McpError::upstream("getSlot returned no value"))
    }

    /// Base64 account data plus metadata, or None for a missing account.
    async fn get_account_info(&self, address: &str) -> McpResult<Option<Value>> {
        let result = self
            .call(
                "getAccountInfo",
                serde_json::json!([address, { "encoding": "base64" }]),
            )
            .await?;
        match &result["value"] {
            Value::Null => Ok(None),
            value => Ok(Some(value.clone())),
        }
    }
}

/// Lamports per SOL (1 SOL = 10^9 lamports).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Render a lamport amount as a SOL figure without trailing zeros.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        format!("{whole}")
    } else {
        let frac = format!("{frac:09}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

/// Validate a base58-encoded 32-byte public key.
pub fn validate_pubkey(path: &str, s: &str) -> McpResult<()> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| McpError::validation(path, "not valid base58"))?;
    if bytes.len() != 32 {
        return Err(McpError::validation(
            path,
            format!("decoded to {} bytes, expected 32", bytes.len()),
        ));
    }
    Ok(())
}
