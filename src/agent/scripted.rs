//! A run that replays a fixed script of nodes and events.
//!
//! Useful for exercising consumers without a model behind them. The script
//! is plain data, so a `ScriptedRun` can be cloned and replayed any number of
//! times with identical results.

use crate::agent::events::{
    FunctionToolCallEvent, FunctionToolResultEvent, HandleResponseEvent, ModelResponseEvent,
    PartDeltaEvent, PartEndEvent, PartStartEvent, ToolReturn,
};
use crate::agent::messages::{
    ModelResponse, Part, PartDelta, TextPart, TextPartDelta, ToolCallPart, ToolCallPartDelta,
};
use crate::agent::nodes::{CallToolsNode, EndNode, ModelRequestNode, Node, UserPromptNode};
use crate::agent::run::{AgentRun, AgentRunResult, NodeEventStream};
use crate::error::{AgentStreamError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum ScriptedStep {
    UserPrompt(String),
    ModelRequest {
        events: Vec<ModelResponseEvent>,
        failure: Option<String>,
    },
    CallTools {
        events: Vec<HandleResponseEvent>,
        failure: Option<String>,
    },
    End(String),
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    steps: VecDeque<ScriptedStep>,
    model_requests: usize,
    current_model: Option<(Vec<ModelResponseEvent>, Option<String>)>,
    current_tools: Option<(Vec<HandleResponseEvent>, Option<String>)>,
    reported_output: Option<String>,
    result: Option<AgentRunResult>,
}

impl ScriptedRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.steps.push_back(ScriptedStep::UserPrompt(prompt.into()));
        self
    }

    pub fn model_request(mut self, events: Vec<ModelResponseEvent>) -> Self {
        self.steps.push_back(ScriptedStep::ModelRequest {
            events,
            failure: None,
        });
        self
    }

    /// A model request whose stream yields `events` and then fails
    pub fn failing_model_request(
        mut self,
        events: Vec<ModelResponseEvent>,
        message: impl Into<String>,
    ) -> Self {
        self.steps.push_back(ScriptedStep::ModelRequest {
            events,
            failure: Some(message.into()),
        });
        self
    }

    pub fn call_tools(mut self, events: Vec<HandleResponseEvent>) -> Self {
        self.steps.push_back(ScriptedStep::CallTools {
            events,
            failure: None,
        });
        self
    }

    /// A call-tools node whose stream yields `events` and then fails
    pub fn failing_call_tools(
        mut self,
        events: Vec<HandleResponseEvent>,
        message: impl Into<String>,
    ) -> Self {
        self.steps.push_back(ScriptedStep::CallTools {
            events,
            failure: Some(message.into()),
        });
        self
    }

    pub fn end(mut self, output: impl Into<String>) -> Self {
        self.steps.push_back(ScriptedStep::End(output.into()));
        self
    }

    /// Make `result()` report `output` instead of the end node's output
    pub fn reporting_output(mut self, output: impl Into<String>) -> Self {
        self.reported_output = Some(output.into());
        self
    }
}

fn replay<E: Send + 'static>(
    scripted: Option<(Vec<E>, Option<String>)>,
) -> NodeEventStream<'static, E> {
    let (events, failure) = scripted.unwrap_or_default();
    let items = events
        .into_iter()
        .map(Ok)
        .chain(failure.into_iter().map(|message| Err(AgentStreamError::RunError(message))));
    Box::pin(futures::stream::iter(items))
}

#[async_trait]
impl AgentRun for ScriptedRun {
    async fn next_node(&mut self) -> Result<Option<Node>> {
        self.current_model = None;
        self.current_tools = None;

        let Some(step) = self.steps.pop_front() else {
            return Ok(None);
        };

        let node = match step {
            ScriptedStep::UserPrompt(user_prompt) => {
                Node::UserPrompt(UserPromptNode { user_prompt })
            }
            ScriptedStep::ModelRequest { events, failure } => {
                self.model_requests += 1;
                self.current_model = Some((events, failure));
                Node::ModelRequest(ModelRequestNode {
                    step: self.model_requests,
                    messages: Vec::new(),
                })
            }
            ScriptedStep::CallTools { events, failure } => {
                let parts = events
                    .iter()
                    .filter_map(|event| match event {
                        HandleResponseEvent::FunctionToolCall(call) => {
                            Some(Part::ToolCall(call.part.clone()))
                        }
                        HandleResponseEvent::FunctionToolResult(_) => None,
                    })
                    .collect();
                self.current_tools = Some((events, failure));
                Node::CallTools(CallToolsNode {
                    model_response: ModelResponse { parts },
                })
            }
            ScriptedStep::End(output) => {
                self.result = Some(AgentRunResult {
                    output: self.reported_output.clone().unwrap_or_else(|| output.clone()),
                });
                Node::End(EndNode { output })
            }
        };

        Ok(Some(node))
    }

    fn stream_model_request<'a>(
        &'a mut self,
        _node: &ModelRequestNode,
    ) -> NodeEventStream<'a, ModelResponseEvent> {
        replay(self.current_model.take())
    }

    fn stream_call_tools<'a>(
        &'a mut self,
        _node: &CallToolsNode,
    ) -> NodeEventStream<'a, HandleResponseEvent> {
        replay(self.current_tools.take())
    }

    fn result(&self) -> Option<&AgentRunResult> {
        self.result.as_ref()
    }
}

/// Start of a text part with initial `content`
pub fn text_start(index: usize, content: &str) -> ModelResponseEvent {
    ModelResponseEvent::PartStart(PartStartEvent {
        index,
        part: Part::Text(TextPart {
            content: content.to_string(),
        }),
    })
}

pub fn text_delta(index: usize, content: &str) -> ModelResponseEvent {
    ModelResponseEvent::PartDelta(PartDeltaEvent {
        index,
        delta: PartDelta::Text(TextPartDelta {
            content_delta: content.to_string(),
        }),
    })
}

pub fn text_end(index: usize, content: &str) -> ModelResponseEvent {
    ModelResponseEvent::PartEnd(PartEndEvent {
        index,
        part: Part::Text(TextPart {
            content: content.to_string(),
        }),
    })
}

/// Start of a tool call part with no arguments yet
pub fn tool_call_start(index: usize, tool_name: &str, tool_call_id: &str) -> ModelResponseEvent {
    ModelResponseEvent::PartStart(PartStartEvent {
        index,
        part: Part::ToolCall(ToolCallPart {
            tool_name: tool_name.to_string(),
            args: String::new(),
            tool_call_id: tool_call_id.to_string(),
        }),
    })
}

pub fn args_delta(index: usize, args: &str) -> ModelResponseEvent {
    ModelResponseEvent::PartDelta(PartDeltaEvent {
        index,
        delta: PartDelta::ToolCall(ToolCallPartDelta {
            tool_name_delta: None,
            args_delta: args.to_string(),
            tool_call_id: None,
        }),
    })
}

pub fn tool_call(tool_name: &str, args: &str, tool_call_id: &str) -> HandleResponseEvent {
    HandleResponseEvent::FunctionToolCall(FunctionToolCallEvent {
        part: ToolCallPart {
            tool_name: tool_name.to_string(),
            args: args.to_string(),
            tool_call_id: tool_call_id.to_string(),
        },
    })
}

pub fn tool_result(tool_name: &str, tool_call_id: &str, content: &str) -> HandleResponseEvent {
    HandleResponseEvent::FunctionToolResult(FunctionToolResultEvent {
        tool_call_id: tool_call_id.to_string(),
        result: ToolReturn {
            tool_name: tool_name.to_string(),
            content: content.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::run::drain_run;
    use futures::stream::StreamExt;

    #[tokio::test]
    async fn test_nodes_replay_in_script_order() {
        let mut run = ScriptedRun::new()
            .user_prompt("X")
            .model_request(vec![text_start(0, "Hi")])
            .call_tools(vec![])
            .end("Hi");

        let mut kinds = Vec::new();
        while let Some(node) = run.next_node().await.unwrap() {
            kinds.push(node.kind());
        }

        assert_eq!(kinds, vec!["UserPromptNode", "ModelRequestNode", "CallToolsNode", "EndNode"]);
        assert_eq!(run.result().unwrap().output, "Hi");
    }

    #[tokio::test]
    async fn test_stream_yields_scripted_events() {
        let mut run =
            ScriptedRun::new().model_request(vec![text_start(0, "Hel"), text_delta(0, "lo")]);

        let Some(Node::ModelRequest(node)) = run.next_node().await.unwrap() else {
            panic!("expected ModelRequestNode");
        };
        let events: Vec<_> = run
            .stream_model_request(&node)
            .map(|e| e.unwrap())
            .collect()
            .await;

        assert_eq!(events, vec![text_start(0, "Hel"), text_delta(0, "lo")]);
    }

    #[tokio::test]
    async fn test_failure_follows_events() {
        let mut run = ScriptedRun::new().failing_call_tools(
            vec![tool_call("get_weather", "{}", "0001")],
            "tool exploded",
        );

        let Some(Node::CallTools(node)) = run.next_node().await.unwrap() else {
            panic!("expected CallToolsNode");
        };
        assert_eq!(node.model_response.tool_calls()[0].tool_call_id, "0001");

        let mut events = run.stream_call_tools(&node);
        assert!(events.next().await.unwrap().is_ok());
        let err = events.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Run error: tool exploded");
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unstreamed_events_are_discarded() {
        let mut run = ScriptedRun::new()
            .model_request(vec![text_start(0, "ignored")])
            .end("done");

        let result = drain_run(&mut run).await.unwrap();

        assert_eq!(result.unwrap().output, "done");
    }

    #[tokio::test]
    async fn test_reported_output_override() {
        let mut run = ScriptedRun::new().end("node output").reporting_output("other");
        run.next_node().await.unwrap();

        assert_eq!(run.result().unwrap().output, "other");
    }
}
