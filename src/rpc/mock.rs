//! Mock collaborator for tests and `--mock` mode
//!
//! Returns canned results per method and counts every call, so tests can
//! assert that validation failures never reach the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::SolanaRpc;
use crate::error::{McpError, McpResult};

enum Canned {
    Result(Value),
    Error(String),
}

#[derive(Default)]
pub struct MockRpc {
    responses: Mutex<HashMap<String, Canned>>,
    calls: AtomicU64,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic defaults so `--mock` mode answers every read tool.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_result("getBalance", serde_json::json!({ "value": 1_000_000_000u64 }))
            .with_result("getSlot", serde_json::json!(250_000_000u64))
            .with_result(
                "getEpochInfo",
                serde_json::json!({ "epoch": 580, "slotIndex": 1024, "slotsInEpoch": 432000 }),
            )
            .with_result(
                "getLatestBlockhash",
                serde_json::json!({
                    "value": { "blockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N", "lastValidBlockHeight": 3090 }
                }),
            )
            .with_result("getHealth", serde_json::json!("ok"))
            .with_result(
                "getVersion",
                serde_json::json!({ "solana-core": "1.18.0", "feature-set": 0 }),
            )
    }

    pub fn with_result(self, method: &str, result: Value) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(method.to_string(), Canned::Result(result));
        self
    }

    pub fn with_error(self, method: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(method.to_string(), Canned::Error(message.to_string()));
        self
    }

    /// Number of calls issued so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn call(&self, method: &str, _params: Value) -> McpResult<Value> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(method)
        {
            Some(Canned::Result(value)) => Ok(value.clone()),
            Some(Canned::Error(message)) => Err(McpError::upstream(message.clone())),
            None => Err(McpError::upstream(format!(
                "mock has no response for {method}"
            ))),
        }
    }
}
