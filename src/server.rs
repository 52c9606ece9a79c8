//! Server assembly: registries are built once here, then shared immutably
//! across transports and in-flight requests.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::diag::DiagLog;
use crate::error::McpResult;
use crate::handlers::ServerState;
use crate::registry::{PromptRegistry, ResourceRegistry, ToolRegistry};
use crate::rpc::SolanaRpc;
use crate::tools::ToolContext;
use crate::{prompts, resources, tools, transport};

pub struct McpServer {
    state: Arc<ServerState>,
}

impl McpServer {
    /// Build the full server: every tool, resource, and prompt registered
    /// against the given RPC collaborator.
    pub fn new(config: Config, rpc: Arc<dyn SolanaRpc>) -> McpResult<Self> {
        let diag = DiagLog::new(config.diag_log.clone());
        let ctx = ToolContext {
            rpc,
            http: reqwest::Client::new(),
            config: Arc::new(config),
            diag: diag.clone(),
        };

        let mut tool_registry = ToolRegistry::new();
        tools::register_all(&mut tool_registry, &ctx)?;

        let mut resource_registry = ResourceRegistry::new();
        resources::register_all(&mut resource_registry, &ctx)?;

        let mut prompt_registry = PromptRegistry::new();
        prompts::register_all(&mut prompt_registry)?;

        info!(
            "registered {} tools, {} resources, {} prompts",
            tool_registry.len(),
            resource_registry.list().len(),
            prompt_registry.list().len()
        );

        Ok(Self {
            state: Arc::new(ServerState::new(
                tool_registry,
                resource_registry,
                prompt_registry,
                diag,
            )),
        })
    }

    pub fn state(&self) -> Arc<ServerState> {
        self.state.clone()
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until stdin closes.
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        transport::stdio::run(self.state.clone()).await
    }

    /// Serve the HTTP/SSE transport on the given port.
    pub async fn run_http(&self, port: u16) -> anyhow::Result<()> {
        transport::sse::run(self.state.clone(), port).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::MockRpc;

    #[tokio::test]
    async fn test_full_surface_registers() {
        let server = McpServer::new(Config::default(), Arc::new(MockRpc::new())).unwrap();
        let state = server.state();
        assert!(state.tools.len() >= 20);
        assert_eq!(state.resources.list().len(), 3);
        assert_eq!(state.prompts.list().len(), 3);
    }
}
