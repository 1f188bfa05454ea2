//! Protocol-level tool errors.
//!
//! Only caller-input mistakes (and failures of the fetch helper) become a
//! `ToolError`. Anything that depends on the state of a physical device is
//! reported as descriptive text instead, so the agent can keep going.

use thiserror::Error;

/// JSON-RPC code for invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// JSON-RPC code for internal errors.
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Bad or missing argument, unknown device, duplicate id, unsupported action.
    #[error("{0}")]
    InvalidParams(String),
    /// Unexpected failure in a utility tool.
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// JSON-RPC error code surfaced to the transport.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
