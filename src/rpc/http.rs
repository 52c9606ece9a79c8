//! HTTP implementation of the Solana JSON-RPC collaborator

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::SolanaRpc;
use crate::error::{McpError, McpResult};

pub struct HttpRpc {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpc {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SolanaRpc for HttpRpc {
    async fn call(&self, method: &str, params: Value) -> McpResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
        });
        if !params.is_null() {
            body["params"] = params;
        }

        debug!("rpc call {} (id: {})", method, id);

        let response: Value = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            let message = error["message"].as_str().unwrap_or("unknown RPC error");
            let code = error["code"].as_i64().unwrap_or(0);
            return Err(McpError::upstream(format!(
                "RPC error {code}: {message}"
            )));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| McpError::upstream(format!("{method} response carried no result")))
    }
}
