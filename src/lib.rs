//! Solana MCP server
//!
//! A Model Context Protocol server exposing Solana blockchain operations as
//! tools, resources, and prompts. Speaks JSON-RPC 2.0 over two transports:
//! newline-delimited stdio and HTTP with server-sent events.
//!
//! The design is registry-centric: tools, resources, and prompts are
//! registered once at startup into explicit registry objects and are
//! immutable afterwards, so a shared [`handlers::ServerState`] serves
//! concurrent requests without coarse locking. Tool inputs are validated
//! against typed schemas before any handler runs; handler failures fold
//! into error-flagged result content rather than protocol faults.

pub mod config;
pub mod diag;
pub mod error;
pub mod handlers;
pub mod idl;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod rpc;
pub mod schema;
pub mod server;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{McpError, McpResult};
pub use server::McpServer;
