pub mod gateway;
pub mod gateways;
pub mod models;

pub use gateway::{ChunkStream, CompletionConfig, LlmGateway, StreamChunk};
pub use models::{LlmMessage, LlmToolCall, MessageRole};
