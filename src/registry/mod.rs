//! Tool, resource, and prompt registries
//!
//! Explicit registry objects owned by the server instance and constructed
//! once at startup. Handlers are registered behind boxed async closures;
//! the registries themselves are immutable after startup, so concurrent
//! dispatches share them without locking.

mod prompts;
mod resources;
mod tools;

pub use prompts::{required_str, PromptDef, PromptRegistry};
pub use resources::{ResourceDef, ResourceRegistry};
pub use tools::{ToolDef, ToolRegistry};
