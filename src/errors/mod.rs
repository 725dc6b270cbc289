mod falcon_error;
mod mcp_error;
mod tool_error;

pub use falcon_error::FalconError;
pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
