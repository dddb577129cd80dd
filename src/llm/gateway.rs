use crate::error::Result;
use crate::llm::models::LlmMessage;
use crate::tools::ToolDescriptor;
use futures::stream::Stream;
use std::pin::Pin;

/// Configuration for LLM completion
#[derive(Debug, Clone, Default)]
pub struct CompletionConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

/// One raw increment of a streamed completion, before it is assigned to a part
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Visible assistant text
    Content(String),
    /// Reasoning text, for models that stream it separately
    Thinking(String),
    /// A fragment of a tool call, keyed by the vendor's tool-call index
    ToolCallFragment {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments: String,
    },
}

pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>>;

/// Abstract interface for LLM providers
pub trait LlmGateway: Send + Sync {
    /// Stream a completion for `messages`, offering `tools` to the model
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: &'a [ToolDescriptor],
        config: &'a CompletionConfig,
    ) -> ChunkStream<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_config_default() {
        let config = CompletionConfig::default();

        assert_eq!(config.temperature, None);
        assert_eq!(config.max_tokens, None);
    }

    #[test]
    fn test_stream_chunk_equality() {
        let a = StreamChunk::ToolCallFragment {
            index: 0,
            id: Some("0001".to_string()),
            name: Some("weather_forecast".to_string()),
            arguments: String::new(),
        };
        assert_eq!(a.clone(), a);
        assert_ne!(StreamChunk::Content("x".into()), StreamChunk::Thinking("x".into()));
    }
}
