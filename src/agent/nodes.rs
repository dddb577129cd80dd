//! Top-level stages of an agent run.

use crate::agent::messages::ModelResponse;
use crate::llm::models::LlmMessage;
use serde::{Deserialize, Serialize};

/// The user's prompt entering the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPromptNode {
    pub user_prompt: String,
}

/// A request to the model; streaming it yields part events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequestNode {
    /// 1-based count of model requests made so far in this run
    pub step: usize,
    pub messages: Vec<LlmMessage>,
}

/// Handling of a model response; streaming it runs the requested tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolsNode {
    pub model_response: ModelResponse,
}

/// Completion of the run, carrying its final output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndNode {
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_kind", rename_all = "snake_case")]
pub enum Node {
    UserPrompt(UserPromptNode),
    ModelRequest(ModelRequestNode),
    CallTools(CallToolsNode),
    End(EndNode),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::UserPrompt(_) => "UserPromptNode",
            Node::ModelRequest(_) => "ModelRequestNode",
            Node::CallTools(_) => "CallToolsNode",
            Node::End(_) => "EndNode",
        }
    }
}
