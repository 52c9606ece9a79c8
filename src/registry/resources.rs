//! Resource registry: exact-match URIs to fetch handlers
//!
//! Simpler than the tool registry: no input validation beyond the URI.
//! Fetch handlers perform at most one outbound fetch; on network failure the
//! content item carries `Error: <message>` text rather than a fault.

use std::collections::HashMap;

use futures::future::BoxFuture;

use crate::error::{McpError, McpResult};
use crate::protocol::{Resource, ResourceContent, ResourceTemplate, ResourcesReadResult};

type BoxFetch = Box<dyn Fn() -> BoxFuture<'static, McpResult<Vec<ResourceContent>>> + Send + Sync>;

pub struct ResourceDef {
    pub resource: Resource,
    fetch: BoxFetch,
}

impl ResourceDef {
    pub fn new<F, Fut>(resource: Resource, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = McpResult<Vec<ResourceContent>>> + Send + 'static,
    {
        Self {
            resource,
            fetch: Box::new(move || Box::pin(fetch())),
        }
    }
}

#[derive(Default)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDef>,
    index: HashMap<String, usize>,
    templates: Vec<ResourceTemplate>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: ResourceDef) -> McpResult<()> {
        let uri = def.resource.uri.clone();
        if self.index.contains_key(&uri) {
            return Err(McpError::DuplicateName(uri));
        }
        self.index.insert(uri, self.resources.len());
        self.resources.push(def);
        Ok(())
    }

    pub fn list(&self) -> Vec<Resource> {
        self.resources.iter().map(|d| d.resource.clone()).collect()
    }

    pub fn templates(&self) -> Vec<ResourceTemplate> {
        self.templates.clone()
    }

    /// Resolve a URI by exact string match and run its fetch handler.
    /// A fetch failure is folded into `Error: <message>` content.
    pub async fn resolve(&self, uri: &str) -> McpResult<ResourcesReadResult> {
        let def = self
            .index
            .get(uri)
            .map(|&i| &self.resources[i])
            .ok_or_else(|| McpError::UnknownResource(uri.to_string()))?;

        let contents = match (def.fetch)().await {
            Ok(contents) => contents,
            Err(e) => vec![ResourceContent {
                uri: uri.to_string(),
                mime_type: Some("text/plain".to_string()),
                text: Some(format!("Error: {e}")),
            }],
        };

        Ok(ResourcesReadResult { contents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_resource(uri: &str, body: &str) -> ResourceDef {
        let uri_owned = uri.to_string();
        let body = body.to_string();
        ResourceDef::new(
            Resource {
                uri: uri.to_string(),
                name: "Test".to_string(),
                description: None,
                mime_type: Some("text/plain".to_string()),
            },
            move || {
                let uri = uri_owned.clone();
                let body = body.clone();
                async move {
                    Ok(vec![ResourceContent {
                        uri,
                        mime_type: Some("text/plain".to_string()),
                        text: Some(body),
                    }])
                }
            },
        )
    }

    #[tokio::test]
    async fn test_exact_match_resolve() {
        let mut reg = ResourceRegistry::new();
        reg.register(static_resource("solana://docs/test", "hello"))
            .unwrap();

        let result = reg.resolve("solana://docs/test").await.unwrap();
        assert_eq!(result.contents[0].text.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_unknown_uri() {
        let reg = ResourceRegistry::new();
        let err = reg.resolve("solana://missing").await.unwrap_err();
        assert!(matches!(err, McpError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_no_prefix_matching() {
        let mut reg = ResourceRegistry::new();
        reg.register(static_resource("solana://docs/test", "hello"))
            .unwrap();
        assert!(reg.resolve("solana://docs/test/extra").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_error_content() {
        let mut reg = ResourceRegistry::new();
        reg.register(ResourceDef::new(
            Resource {
                uri: "solana://broken".to_string(),
                name: "Broken".to_string(),
                description: None,
                mime_type: None,
            },
            || async { Err(McpError::upstream("connection refused")) },
        ))
        .unwrap();

        let result = reg.resolve("solana://broken").await.unwrap();
        assert_eq!(
            result.contents[0].text.as_deref(),
            Some("Error: connection refused")
        );
    }
}
