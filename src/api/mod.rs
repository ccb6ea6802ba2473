/*!
 * API Module
 * Tool definitions, dispatch and the stdio transport
 */

pub mod server;
pub mod tools;

pub use server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, StdioServer};
pub use tools::{tool_definitions, TextContent, ToolDefinition, ToolDispatcher};
