//! The run abstraction the consumer drives.

use crate::agent::events::{HandleResponseEvent, ModelResponseEvent};
use crate::agent::nodes::{CallToolsNode, ModelRequestNode, Node};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Stream of events from inside one node. It borrows the run, so only one
/// node stream can be open at a time and dropping it releases the run.
pub type NodeEventStream<'a, E> = Pin<Box<dyn Stream<Item = Result<E>> + Send + 'a>>;

/// Context handed to tools while a run executes
#[derive(Debug)]
pub struct RunContext<D> {
    pub deps: Arc<D>,
    pub prompt: String,
    /// Number of model requests made so far
    pub run_step: usize,
}

impl<D> RunContext<D> {
    pub fn new(deps: Arc<D>, prompt: impl Into<String>) -> Self {
        Self {
            deps,
            prompt: prompt.into(),
            run_step: 0,
        }
    }
}

impl<D> Clone for RunContext<D> {
    fn clone(&self) -> Self {
        Self {
            deps: Arc::clone(&self.deps),
            prompt: self.prompt.clone(),
            run_step: self.run_step,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRunResult {
    pub output: String,
}

/// One execution of an agent, iterated node by node.
///
/// `next_node` yields nodes in order until the run is over. Model request and
/// call-tools nodes can be streamed for their inner events; a node that was
/// not streamed (or only partly) is completed by the following `next_node`
/// call, so skipping a stream never changes the run's outcome.
#[async_trait]
pub trait AgentRun: Send {
    /// Advance to the next node, or `None` once the run has ended
    async fn next_node(&mut self) -> Result<Option<Node>>;

    /// Stream the part events of a model request node
    fn stream_model_request<'a>(
        &'a mut self,
        node: &ModelRequestNode,
    ) -> NodeEventStream<'a, ModelResponseEvent>;

    /// Stream the tool call and result events of a call-tools node
    fn stream_call_tools<'a>(
        &'a mut self,
        node: &CallToolsNode,
    ) -> NodeEventStream<'a, HandleResponseEvent>;

    /// Final result; present once the end node has been yielded
    fn result(&self) -> Option<&AgentRunResult>;
}

/// Drive a run to completion without looking at any events.
pub async fn drain_run<R: AgentRun + ?Sized>(run: &mut R) -> Result<Option<AgentRunResult>> {
    while run.next_node().await?.is_some() {}
    Ok(run.result().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_context_clone_shares_deps() {
        let ctx = RunContext::new(Arc::new(vec![1, 2, 3]), "prompt");
        let copy = ctx.clone();

        assert!(Arc::ptr_eq(&ctx.deps, &copy.deps));
        assert_eq!(copy.prompt, "prompt");
        assert_eq!(copy.run_step, 0);
    }
}
