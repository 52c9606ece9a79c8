//! Built-in prompt templates.

use crate::error::McpResult;
use crate::protocol::{Prompt, PromptArgument, PromptMessage, PromptsGetResult};
use crate::registry::{required_str, PromptDef, PromptRegistry};

pub fn register_all(registry: &mut PromptRegistry) -> McpResult<()> {
    registry.register(PromptDef::new(
        Prompt {
            name: "analyze_transaction".to_string(),
            description: Some("Walk through a transaction's instructions and effects".to_string()),
            arguments: Some(vec![PromptArgument {
                name: "signature".to_string(),
                description: Some("Transaction signature (base58)".to_string()),
                required: Some(true),
            }]),
        },
        |params| {
            let signature = required_str(params, "signature")?;
            Ok(PromptsGetResult {
                description: Some("Transaction analysis".to_string()),
                messages: vec![PromptMessage::user(format!(
                    "Analyze the Solana transaction with signature {signature}. \
                     Use the getTransaction tool to fetch it, then explain each \
                     instruction, the accounts it touched, the fee paid, and \
                     whether it succeeded."
                ))],
            })
        },
    ))?;

    registry.register(PromptDef::new(
        Prompt {
            name: "explore_account".to_string(),
            description: Some("Inspect an account's balance, owner, and data".to_string()),
            arguments: Some(vec![PromptArgument {
                name: "address".to_string(),
                description: Some("Account address (base58)".to_string()),
                required: Some(true),
            }]),
        },
        |params| {
            let address = required_str(params, "address")?;
            Ok(PromptsGetResult {
                description: Some("Account exploration".to_string()),
                messages: vec![PromptMessage::user(format!(
                    "Explore the Solana account {address}. Use getBalance and \
                     getAccountInfo to fetch its state, identify the owning \
                     program, and describe what kind of account it appears to be."
                ))],
            })
        },
    ))?;

    registry.register(PromptDef::new(
        Prompt {
            name: "build_program_instruction".to_string(),
            description: Some(
                "Build an instruction for an Anchor program from its IDL".to_string(),
            ),
            arguments: Some(vec![
                PromptArgument {
                    name: "programId".to_string(),
                    description: Some("Program address (base58)".to_string()),
                    required: Some(true),
                },
                PromptArgument {
                    name: "instruction".to_string(),
                    description: Some("Instruction name to build".to_string()),
                    required: Some(true),
                },
            ]),
        },
        |params| {
            let program_id = required_str(params, "programId")?;
            let instruction = required_str(params, "instruction")?;
            Ok(PromptsGetResult {
                description: Some("Instruction construction".to_string()),
                messages: vec![PromptMessage::user(format!(
                    "Build the `{instruction}` instruction for program \
                     {program_id}. Fetch its IDL with fetchProgramIdl, list the \
                     declared arguments and accounts, then use testProgramIdl to \
                     assemble the instruction with concrete values."
                ))],
            })
        },
    ))?;

    Ok(())
}
