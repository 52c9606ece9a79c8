//! Prompt registry: parametrized message templates
//!
//! Purely textual; no external calls and no failure modes beyond an unknown
//! name or a missing required argument.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{McpError, McpResult};
use crate::protocol::{Prompt, PromptsGetResult};

type BoxRender = Box<dyn Fn(&Map<String, Value>) -> McpResult<PromptsGetResult> + Send + Sync>;

pub struct PromptDef {
    pub prompt: Prompt,
    render: BoxRender,
}

impl PromptDef {
    pub fn new<F>(prompt: Prompt, render: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> McpResult<PromptsGetResult> + Send + Sync + 'static,
    {
        Self {
            prompt,
            render: Box::new(render),
        }
    }
}

#[derive(Default)]
pub struct PromptRegistry {
    prompts: Vec<PromptDef>,
    index: HashMap<String, usize>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: PromptDef) -> McpResult<()> {
        let name = def.prompt.name.clone();
        if self.index.contains_key(&name) {
            return Err(McpError::DuplicateName(name));
        }
        self.index.insert(name, self.prompts.len());
        self.prompts.push(def);
        Ok(())
    }

    pub fn list(&self) -> Vec<Prompt> {
        self.prompts.iter().map(|d| d.prompt.clone()).collect()
    }

    /// Render a prompt with the given parameters.
    pub fn render(
        &self,
        name: &str,
        params: Option<&Map<String, Value>>,
    ) -> McpResult<PromptsGetResult> {
        let def = self
            .index
            .get(name)
            .map(|&i| &self.prompts[i])
            .ok_or_else(|| McpError::UnknownPrompt(name.to_string()))?;

        let empty = Map::new();
        (def.render)(params.unwrap_or(&empty))
    }
}

/// Pull a required string argument out of prompt parameters.
pub fn required_str<'a>(params: &'a Map<String, Value>, name: &str) -> McpResult<&'a str> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::validation(name, "missing required argument"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PromptMessage;

    fn greeting_prompt() -> PromptDef {
        PromptDef::new(
            Prompt {
                name: "greet".to_string(),
                description: Some("Greet someone".to_string()),
                arguments: None,
            },
            |params| {
                let who = required_str(params, "who")?;
                Ok(PromptsGetResult {
                    description: None,
                    messages: vec![PromptMessage::user(format!("Hello, {who}!"))],
                })
            },
        )
    }

    #[test]
    fn test_render_substitutes_params() {
        let mut reg = PromptRegistry::new();
        reg.register(greeting_prompt()).unwrap();

        let mut params = Map::new();
        params.insert("who".to_string(), Value::String("abc".to_string()));
        let result = reg.render("greet", Some(&params)).unwrap();
        match &result.messages[0].content {
            crate::protocol::PromptContent::Text { text } => assert!(text.contains("abc")),
        }
    }

    #[test]
    fn test_unknown_prompt() {
        let reg = PromptRegistry::new();
        let err = reg.render("missing", None).unwrap_err();
        assert!(matches!(err, McpError::UnknownPrompt(_)));
    }

    #[test]
    fn test_missing_argument() {
        let mut reg = PromptRegistry::new();
        reg.register(greeting_prompt()).unwrap();
        let err = reg.render("greet", None).unwrap_err();
        assert!(matches!(err, McpError::Validation { ref path, .. } if path == "who"));
    }
}
