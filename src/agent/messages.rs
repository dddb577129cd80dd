//! Parts of a model response and the deltas that build them up.

use crate::llm::models::{LlmMessage, LlmToolCall};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingPart {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    pub tool_name: String,
    /// Raw JSON argument text as streamed by the model
    pub args: String,
    pub tool_call_id: String,
}

/// An addressable unit of model output, identified by its index in the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
pub enum Part {
    Text(TextPart),
    Thinking(ThinkingPart),
    ToolCall(ToolCallPart),
}

impl Part {
    /// Text carried by the part, if it is a text-bearing kind
    pub fn content(&self) -> Option<&str> {
        match self {
            Part::Text(part) => Some(&part.content),
            Part::Thinking(part) => Some(&part.content),
            Part::ToolCall(_) => None,
        }
    }

    /// Fold a delta into this part. Returns false when the delta kind does
    /// not fit the part kind.
    pub fn apply(&mut self, delta: &PartDelta) -> bool {
        match (self, delta) {
            (Part::Text(part), PartDelta::Text(d)) => part.content.push_str(&d.content_delta),
            (Part::Thinking(part), PartDelta::Thinking(d)) => {
                part.content.push_str(&d.content_delta)
            }
            (Part::ToolCall(part), PartDelta::ToolCall(d)) => {
                if let Some(name) = &d.tool_name_delta {
                    part.tool_name.push_str(name);
                }
                if let Some(id) = &d.tool_call_id {
                    part.tool_call_id = id.clone();
                }
                part.args.push_str(&d.args_delta);
            }
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Text(part) => write!(f, "TextPart(content={:?})", part.content),
            Part::Thinking(part) => write!(f, "ThinkingPart(content={:?})", part.content),
            Part::ToolCall(part) => write!(
                f,
                "ToolCallPart(tool_name={:?}, args={:?}, tool_call_id={:?})",
                part.tool_name, part.args, part.tool_call_id
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPartDelta {
    pub content_delta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingPartDelta {
    pub content_delta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPartDelta {
    pub tool_name_delta: Option<String>,
    pub args_delta: String,
    pub tool_call_id: Option<String>,
}

/// Incremental fragment of a part's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_delta_kind", rename_all = "kebab-case")]
pub enum PartDelta {
    Text(TextPartDelta),
    Thinking(ThinkingPartDelta),
    ToolCall(ToolCallPartDelta),
}

/// Complete response of one model request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub parts: Vec<Part>,
}

impl ModelResponse {
    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_calls(&self) -> Vec<&ToolCallPart> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::ToolCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Assistant message recording this response in the conversation
    pub fn to_message(&self) -> LlmMessage {
        let text = self.text();
        let calls: Vec<LlmToolCall> = self
            .tool_calls()
            .into_iter()
            .map(|call| LlmToolCall {
                id: call.tool_call_id.clone(),
                name: call.tool_name.clone(),
                arguments: call.args.clone(),
            })
            .collect();

        if calls.is_empty() {
            LlmMessage::assistant(text)
        } else {
            let content = if text.is_empty() { None } else { Some(text) };
            LlmMessage::assistant_tool_calls(content, calls)
        }
    }
}
