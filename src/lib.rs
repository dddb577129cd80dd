//! Stream an agent run node by node and record every event it produces.

pub mod agent;
pub mod config;
pub mod consumer;
pub mod demo;
pub mod error;
pub mod llm;
pub mod logging;
pub mod tools;

pub use error::{AgentStreamError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentRun, AgentRunResult, Node, RunContext, ScriptedRun};
    pub use crate::consumer::{
        CapturedConsole, Console, ConsumerOptions, OutputLog, StdoutConsole, StreamConsumer,
    };
    pub use crate::error::{AgentStreamError, Result};
    pub use crate::llm::gateways::OpenAIGateway;
    pub use crate::llm::{CompletionConfig, LlmGateway, LlmMessage, MessageRole};
    pub use crate::tools::{AgentTool, ToolDescriptor};
}
