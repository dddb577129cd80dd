//! Fine-grained events streamed from inside a node.
//!
//! A model request node yields [`ModelResponseEvent`]s; a call-tools node
//! yields [`HandleResponseEvent`]s. Each is a closed enum so consumers match
//! on every variant.

use crate::agent::messages::{Part, PartDelta, ToolCallPart};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartStartEvent {
    pub index: usize,
    pub part: Part,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDeltaEvent {
    pub index: usize,
    pub delta: PartDelta,
}

/// Emitted once a part is complete; `part` holds its accumulated content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartEndEvent {
    pub index: usize,
    pub part: Part,
}

/// The model started producing output that will become the run's result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResultEvent {
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum ModelResponseEvent {
    PartStart(PartStartEvent),
    PartDelta(PartDeltaEvent),
    PartEnd(PartEndEvent),
    FinalResult(FinalResultEvent),
}

impl ModelResponseEvent {
    /// Part index the event refers to, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            ModelResponseEvent::PartStart(e) => Some(e.index),
            ModelResponseEvent::PartDelta(e) => Some(e.index),
            ModelResponseEvent::PartEnd(e) => Some(e.index),
            ModelResponseEvent::FinalResult(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionToolCallEvent {
    pub part: ToolCallPart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolReturn {
    pub tool_name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionToolResultEvent {
    pub tool_call_id: String,
    pub result: ToolReturn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum HandleResponseEvent {
    FunctionToolCall(FunctionToolCallEvent),
    FunctionToolResult(FunctionToolResultEvent),
}
