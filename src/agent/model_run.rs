//! Run driven by a live model through an [`LlmGateway`](crate::llm::LlmGateway).

use crate::agent::core::Agent;
use crate::agent::events::{
    FunctionToolCallEvent, FunctionToolResultEvent, HandleResponseEvent, ModelResponseEvent,
    ToolReturn,
};
use crate::agent::messages::{ModelResponse, ToolCallPart};
use crate::agent::nodes::{CallToolsNode, EndNode, ModelRequestNode, Node, UserPromptNode};
use crate::agent::parts::PartsManager;
use crate::agent::run::{AgentRun, AgentRunResult, NodeEventStream, RunContext};
use crate::error::{AgentStreamError, Result};
use crate::llm::models::LlmMessage;
use crate::tools::tool_output_text;
use async_trait::async_trait;
use futures::stream::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the next call to `next_node` hands out
#[derive(Debug)]
enum Step {
    UserPrompt,
    ModelRequest,
    CallTools(ModelResponse),
    End(String),
    Done,
}

/// One execution of an [`Agent`].
///
/// Nodes follow UserPrompt, ModelRequest, CallTools, then either another
/// ModelRequest (when tools were called) or End. Conversation state is only
/// updated when a node's stream completes, so a node whose stream was dropped
/// early is simply run again by the next `next_node` call.
pub struct ModelRun<'agent, D> {
    agent: &'agent Agent<D>,
    ctx: RunContext<D>,
    messages: Vec<LlmMessage>,
    next: Step,
    pending: Option<Node>,
    result: Option<AgentRunResult>,
}

impl<'agent, D: Send + Sync + 'static> ModelRun<'agent, D> {
    pub(crate) fn new(agent: &'agent Agent<D>, prompt: String, deps: Arc<D>) -> Self {
        Self {
            agent,
            ctx: RunContext::new(deps, prompt),
            messages: Vec::new(),
            next: Step::UserPrompt,
            pending: None,
            result: None,
        }
    }

    /// Conversation so far, as it will be sent on the next model request
    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn ctx(&self) -> &RunContext<D> {
        &self.ctx
    }

    async fn complete_pending(&mut self, node: Node) -> Result<()> {
        debug!(node = node.kind(), "Completing node that was not streamed");
        match node {
            Node::ModelRequest(request) => {
                let mut events = self.stream_model_request(&request);
                while let Some(event) = events.next().await {
                    event?;
                }
            }
            Node::CallTools(call_tools) => {
                let mut events = self.stream_call_tools(&call_tools);
                while let Some(event) = events.next().await {
                    event?;
                }
            }
            Node::UserPrompt(_) | Node::End(_) => {}
        }
        Ok(())
    }

    async fn call_tool(&self, call: &ToolCallPart) -> Result<String> {
        let tool = self
            .agent
            .find_tool(&call.tool_name)
            .ok_or_else(|| AgentStreamError::UnknownTool(call.tool_name.clone()))?;

        let args: Value = if call.args.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.args)?
        };

        info!(tool = %call.tool_name, tool_call_id = %call.tool_call_id, "Executing tool");
        let output = tool.call(&self.ctx, args).await.inspect_err(|e| {
            warn!(tool = %call.tool_name, "Tool execution failed: {}", e);
        })?;

        Ok(tool_output_text(&output))
    }
}

#[async_trait]
impl<'agent, D: Send + Sync + 'static> AgentRun for ModelRun<'agent, D> {
    async fn next_node(&mut self) -> Result<Option<Node>> {
        if let Some(node) = self.pending.take() {
            self.complete_pending(node).await?;
        }

        let node = match std::mem::replace(&mut self.next, Step::Done) {
            Step::UserPrompt => {
                if let Some(system_prompt) = self.agent.system_prompt() {
                    self.messages.push(LlmMessage::system(system_prompt));
                }
                self.messages.push(LlmMessage::user(self.ctx.prompt.clone()));
                self.next = Step::ModelRequest;

                Node::UserPrompt(UserPromptNode {
                    user_prompt: self.ctx.prompt.clone(),
                })
            }
            Step::ModelRequest => {
                let limit = self.agent.request_limit();
                if self.ctx.run_step >= limit {
                    return Err(AgentStreamError::UsageLimitExceeded(limit));
                }
                self.ctx.run_step += 1;
                info!(model = self.agent.model(), step = self.ctx.run_step, "Model request");

                let node = Node::ModelRequest(ModelRequestNode {
                    step: self.ctx.run_step,
                    messages: self.messages.clone(),
                });
                self.pending = Some(node.clone());
                node
            }
            Step::CallTools(model_response) => {
                let node = Node::CallTools(CallToolsNode { model_response });
                self.pending = Some(node.clone());
                node
            }
            Step::End(output) => {
                info!(steps = self.ctx.run_step, "Run complete");
                self.result = Some(AgentRunResult {
                    output: output.clone(),
                });
                Node::End(EndNode { output })
            }
            Step::Done => return Ok(None),
        };

        Ok(Some(node))
    }

    fn stream_model_request<'a>(
        &'a mut self,
        node: &ModelRequestNode,
    ) -> NodeEventStream<'a, ModelResponseEvent> {
        let messages = node.messages.clone();

        Box::pin(async_stream::try_stream! {
            let agent = self.agent;
            let tools = agent.tool_descriptors();
            let mut parts = PartsManager::new();

            {
                let mut chunks = agent
                    .gateway()
                    .complete_stream(agent.model(), &messages, &tools, agent.config());
                while let Some(chunk) = chunks.next().await {
                    for event in parts.handle(chunk?) {
                        yield event;
                    }
                }
            }

            let (tail, response) = parts.finish();
            for event in tail {
                yield event;
            }

            debug!(parts = response.parts.len(), "Model response complete");
            self.messages.push(response.to_message());
            self.next = Step::CallTools(response);
            self.pending = None;
        })
    }

    fn stream_call_tools<'a>(
        &'a mut self,
        node: &CallToolsNode,
    ) -> NodeEventStream<'a, HandleResponseEvent> {
        let response = node.model_response.clone();

        Box::pin(async_stream::try_stream! {
            let calls: Vec<ToolCallPart> = response.tool_calls().into_iter().cloned().collect();

            if calls.is_empty() {
                self.next = Step::End(response.text());
            } else {
                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    yield HandleResponseEvent::FunctionToolCall(FunctionToolCallEvent {
                        part: call.clone(),
                    });

                    let content = self.call_tool(&call).await?;
                    results.push(LlmMessage::tool(call.tool_call_id.clone(), content.clone()));

                    yield HandleResponseEvent::FunctionToolResult(FunctionToolResultEvent {
                        tool_call_id: call.tool_call_id,
                        result: ToolReturn {
                            tool_name: call.tool_name,
                            content,
                        },
                    });
                }
                self.messages.extend(results);
                self.next = Step::ModelRequest;
            }
            self.pending = None;
        })
    }

    fn result(&self) -> Option<&AgentRunResult> {
        self.result.as_ref()
    }
}
