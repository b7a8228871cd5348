// MCP surface: wire protocol, request dispatch, and the tool framework
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod stdio;
pub mod tool;
