//! Environment-provided configuration
//!
//! Credentials and endpoints are read once at startup. A missing credential
//! disables only the tools that need it; it is never a startup failure.

use std::path::PathBuf;

use crate::idl;

/// Default public RPC endpoint when `SOLANA_RPC_URL` is unset.
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Solana JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Helius API key; absence disables the Helius-backed tools.
    pub helius_api_key: Option<String>,

    /// Dune Analytics API key; absence disables the Dune-backed tools.
    pub dune_api_key: Option<String>,

    /// External signer key reference. The server never signs; this is passed
    /// through to the external signer contract when present.
    pub signer_key: Option<String>,

    /// Append-only diagnostic log file. Best effort; never read back.
    pub diag_log: Option<PathBuf>,

    /// IDL registry consulted first in the fetch fallback chain.
    pub idl_primary_registry: String,

    /// IDL registry consulted after the on-chain lookup.
    pub idl_secondary_registry: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            rpc_url: std::env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            helius_api_key: std::env::var("HELIUS_API_KEY").ok(),
            dune_api_key: std::env::var("DUNE_API_KEY").ok(),
            signer_key: std::env::var("SOLANA_SIGNER_KEY").ok(),
            diag_log: std::env::var("SOLANA_MCP_DIAG_LOG").ok().map(PathBuf::from),
            idl_primary_registry: std::env::var("SOLANA_IDL_PRIMARY_REGISTRY")
                .unwrap_or_else(|_| idl::PRIMARY_REGISTRY.to_string()),
            idl_secondary_registry: std::env::var("SOLANA_IDL_SECONDARY_REGISTRY")
                .unwrap_or_else(|_| idl::SECONDARY_REGISTRY.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            helius_api_key: None,
            dune_api_key: None,
            signer_key: None,
            diag_log: None,
            idl_primary_registry: idl::PRIMARY_REGISTRY.to_string(),
            idl_secondary_registry: idl::SECONDARY_REGISTRY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rpc_url() {
        let config = Config::default();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert!(config.helius_api_key.is_none());
    }
}
