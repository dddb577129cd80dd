//! Error types and result aliases for agent-stream.
//!
//! This module defines the crate-wide error type [`AgentStreamError`] and the
//! [`Result`] alias. Failures anywhere in a run (gateway, tool, consumer) are
//! surfaced through this single type and propagated to the caller untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentStreamError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Usage limit exceeded: more than {0} model requests")]
    UsageLimitExceeded(usize),

    #[error("Final output mismatch: end node has {node:?}, run reported {reported:?}")]
    OutputMismatch {
        node: String,
        reported: Option<String>,
    },

    #[error("Run error: {0}")]
    RunError(String),
}

pub type Result<T> = std::result::Result<T, AgentStreamError>;
