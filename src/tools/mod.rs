//! Tool handler implementations
//!
//! Every tool is a thin wrapper around one external call with light
//! post-processing: formatting, JSON stringification, byte-offset slicing.
//! Handlers receive validated arguments only and report upstream failures
//! through `McpError::Upstream`, which dispatch folds into error content.

mod accounts;
mod analytics;
mod blocks;
mod program_idl;
mod tokens;
mod transactions;

use std::sync::Arc;

use crate::config::Config;
use crate::diag::DiagLog;
use crate::error::McpResult;
use crate::registry::ToolRegistry;
use crate::rpc::SolanaRpc;

/// Shared context captured by tool handlers. Cheap to clone; holds no
/// mutable state, so concurrent dispatches need no locking.
#[derive(Clone)]
pub struct ToolContext {
    pub rpc: Arc<dyn SolanaRpc>,
    pub http: reqwest::Client,
    pub config: Arc<Config>,
    pub diag: DiagLog,
}

impl ToolContext {
    /// IDL client bound to the configured registry endpoints.
    pub fn idl_client(&self) -> crate::idl::IdlClient {
        crate::idl::IdlClient::with_registries(
            self.http.clone(),
            self.rpc.clone(),
            &self.config.idl_primary_registry,
            &self.config.idl_secondary_registry,
        )
    }
}

/// Register the full tool surface.
pub fn register_all(registry: &mut ToolRegistry, ctx: &ToolContext) -> McpResult<()> {
    accounts::register(registry, ctx)?;
    blocks::register(registry, ctx)?;
    tokens::register(registry, ctx)?;
    transactions::register(registry, ctx)?;
    program_idl::register(registry, ctx)?;
    analytics::register(registry, ctx)?;
    Ok(())
}
