//! Assembles streamed chunks into indexed parts and the events describing them.

use crate::agent::events::{
    FinalResultEvent, ModelResponseEvent, PartDeltaEvent, PartEndEvent, PartStartEvent,
};
use crate::agent::messages::{
    ModelResponse, Part, PartDelta, TextPart, TextPartDelta, ThinkingPart, ThinkingPartDelta,
    ToolCallPart, ToolCallPartDelta,
};
use crate::llm::gateway::StreamChunk;
use std::collections::HashMap;
use tracing::warn;

/// Tracks the parts of one model response while it streams.
///
/// At most one part is open at a time. Starting a new part ends the open
/// one, so per index the order is always start, deltas, end, and indices
/// never go backwards.
#[derive(Debug, Default)]
pub struct PartsManager {
    parts: Vec<Part>,
    open: Option<usize>,
    tool_parts: HashMap<usize, usize>,
    final_result_sent: bool,
}

impl PartsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk into the response and return the events it produces
    pub fn handle(&mut self, chunk: StreamChunk) -> Vec<ModelResponseEvent> {
        match chunk {
            StreamChunk::Content(content) => self.handle_text(content),
            StreamChunk::Thinking(content) => self.handle_thinking(content),
            StreamChunk::ToolCallFragment {
                index,
                id,
                name,
                arguments,
            } => self.handle_tool_fragment(index, id, name, arguments),
        }
    }

    /// End the open part and hand back the completed response
    pub fn finish(mut self) -> (Vec<ModelResponseEvent>, ModelResponse) {
        let events = self.end_open();
        (events, ModelResponse { parts: self.parts })
    }

    fn handle_text(&mut self, content: String) -> Vec<ModelResponseEvent> {
        if let Some(index) = self.open_part(|p| matches!(p, Part::Text(_))) {
            let delta = PartDelta::Text(TextPartDelta {
                content_delta: content,
            });
            return self.delta(index, delta);
        }

        let mut events = self.start_part(Part::Text(TextPart { content }));
        if !self.final_result_sent && self.tool_parts.is_empty() {
            self.final_result_sent = true;
            events.push(ModelResponseEvent::FinalResult(FinalResultEvent {
                tool_name: None,
                tool_call_id: None,
            }));
        }
        events
    }

    fn handle_thinking(&mut self, content: String) -> Vec<ModelResponseEvent> {
        if let Some(index) = self.open_part(|p| matches!(p, Part::Thinking(_))) {
            let delta = PartDelta::Thinking(ThinkingPartDelta {
                content_delta: content,
            });
            return self.delta(index, delta);
        }
        self.start_part(Part::Thinking(ThinkingPart { content }))
    }

    fn handle_tool_fragment(
        &mut self,
        vendor_index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: String,
    ) -> Vec<ModelResponseEvent> {
        let Some(index) = self.tool_parts.get(&vendor_index).copied() else {
            let part = ToolCallPart {
                tool_name: name.unwrap_or_default(),
                args: arguments,
                tool_call_id: id.unwrap_or_else(generate_tool_call_id),
            };
            let events = self.start_part(Part::ToolCall(part));
            self.tool_parts.insert(vendor_index, self.parts.len() - 1);
            return events;
        };

        if arguments.is_empty() && name.is_none() && id.is_none() {
            return Vec::new();
        }

        let delta = PartDelta::ToolCall(ToolCallPartDelta {
            tool_name_delta: name,
            args_delta: arguments,
            tool_call_id: id,
        });

        if self.open == Some(index) {
            self.delta(index, delta)
        } else {
            warn!(
                index = index,
                "Tool call fragment arrived after its part ended; folding it in silently"
            );
            self.parts[index].apply(&delta);
            Vec::new()
        }
    }

    fn open_part(&self, kind: impl Fn(&Part) -> bool) -> Option<usize> {
        self.open.filter(|&index| kind(&self.parts[index]))
    }

    fn delta(&mut self, index: usize, delta: PartDelta) -> Vec<ModelResponseEvent> {
        self.parts[index].apply(&delta);
        vec![ModelResponseEvent::PartDelta(PartDeltaEvent { index, delta })]
    }

    fn start_part(&mut self, part: Part) -> Vec<ModelResponseEvent> {
        let mut events = self.end_open();
        let index = self.parts.len();
        self.parts.push(part.clone());
        self.open = Some(index);
        events.push(ModelResponseEvent::PartStart(PartStartEvent { index, part }));
        events
    }

    fn end_open(&mut self) -> Vec<ModelResponseEvent> {
        self.open
            .take()
            .map(|index| {
                ModelResponseEvent::PartEnd(PartEndEvent {
                    index,
                    part: self.parts[index].clone(),
                })
            })
            .into_iter()
            .collect()
    }
}

fn generate_tool_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}
