use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::content::ToolOutcome;
use super::error::{ToolError, ToolResult};
use super::schema::{Args, ToolDescriptor};
use super::traits::Tool;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// A registry for managing available tools.
///
/// Built once at startup and injected into the dispatcher; no runtime
/// mutation after that point.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<DashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(DashMap::new()),
        }
    }

    /// Register a new tool.
    ///
    /// # Panics
    ///
    /// Panics if a tool with the same name is already registered.
    /// Duplicate names are a startup wiring bug, not a runtime condition.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name.to_string();
        info!(target: "tool_registry", tool = %name, "Registering tool");

        let previous = self.tools.insert(name.clone(), tool);
        assert!(previous.is_none(), "Tool '{name}' is already registered");
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|t| t.value().clone())
    }

    /// Descriptors for all registered tools, sorted by name
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut all: Vec<ToolDescriptor> =
            self.tools.iter().map(|t| t.value().descriptor()).collect();
        all.sort_by(|a, b| a.name.cmp(b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name with validated arguments, under a fixed
    /// execution timeout.
    pub async fn call(&self, name: &str, args: Args) -> ToolResult<ToolOutcome> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(format!("tool '{name}'")))?;

        debug!(target: "tool_registry", tool = %name, "Invoking tool");

        match timeout(CALL_TIMEOUT, tool.call(args)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(target: "tool_registry", tool = %name, error = %e, "Tool execution failed");
                }
                result
            }
            Err(_) => {
                warn!(target: "tool_registry", tool = %name, "Tool execution timed out");
                Err(ToolError::Timeout)
            }
        }
    }
}
