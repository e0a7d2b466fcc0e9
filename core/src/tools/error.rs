use thiserror::Error;

use crate::client::ClientError;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    #[error("Timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ToolResult<T> = Result<T, ToolError>;
