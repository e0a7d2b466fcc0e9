//! The tool invocation bridge.
//!
//! Accepts an external-format function call, resolves it against the
//! registry, validates and coerces the arguments against the declared
//! schema, runs the handler, and flattens the outcome into the ordered
//! part list handed to the transport. Mixed results pass through
//! uninspected; this layer never looks inside an image payload.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::RuntimeDefaults;
use crate::tools::{ToolContent, ToolError, ToolRegistry};

/// A structured call received from the orchestrating agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Dispatch failures surfaced to the transport layer.
///
/// Every message is safe to show verbatim to the end user.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    HandlerFailed(String),
}

/// Routes validated tool calls to registered handlers.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    defaults: RuntimeDefaults,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, defaults: RuntimeDefaults) -> Self {
        Self { registry, defaults }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn dispatch(
        &self,
        request: &ToolCallRequest,
    ) -> Result<Vec<ToolContent>, DispatchError> {
        let tool = self
            .registry
            .get(&request.name)
            .ok_or_else(|| DispatchError::NotFound(request.name.clone()))?;

        let args = tool
            .descriptor()
            .validate(&request.arguments, &self.defaults)
            .map_err(|e| match e {
                ToolError::InvalidArguments(detail) => DispatchError::InvalidArguments(detail),
                other => DispatchError::InvalidArguments(other.to_string()),
            })?;

        debug!(target: "dispatch", tool = %request.name, "Dispatching tool call");

        match self.registry.call(&request.name, args).await {
            Ok(outcome) => Ok(outcome.into_parts()),
            Err(ToolError::InvalidArguments(detail)) => {
                Err(DispatchError::InvalidArguments(detail))
            }
            Err(other) => Err(DispatchError::HandlerFailed(other.to_string())),
        }
    }
}
