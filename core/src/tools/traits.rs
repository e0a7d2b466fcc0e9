use async_trait::async_trait;

use super::content::ToolOutcome;
use super::error::ToolResult;
use super::schema::{Args, ToolDescriptor};

/// The core trait for all tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// The declarative descriptor: unique name, description, and
    /// parameter schema
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with validated, coerced arguments
    async fn call(&self, args: Args) -> ToolResult<ToolOutcome>;
}
