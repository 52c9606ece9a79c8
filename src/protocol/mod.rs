//! MCP protocol implementation
//!
//! JSON-RPC 2.0 envelopes plus the Model Context Protocol message types the
//! server speaks. The wire format is external and fixed; nothing here is
//! invented.

pub mod capabilities;
pub mod jsonrpc;
pub mod lifecycle;
pub mod messages;

pub use capabilities::*;
pub use jsonrpc::*;
pub use lifecycle::*;
pub use messages::*;
