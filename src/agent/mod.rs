//! A small agent runtime that hands out its run one node at a time.

mod core;
pub mod events;
pub mod messages;
pub mod model_run;
pub mod nodes;
pub mod parts;
pub mod run;
pub mod scripted;

pub use self::core::{Agent, DEFAULT_REQUEST_LIMIT};
pub use events::{
    FinalResultEvent, FunctionToolCallEvent, FunctionToolResultEvent, HandleResponseEvent,
    ModelResponseEvent, PartDeltaEvent, PartEndEvent, PartStartEvent, ToolReturn,
};
pub use messages::{
    ModelResponse, Part, PartDelta, TextPart, TextPartDelta, ThinkingPart, ThinkingPartDelta,
    ToolCallPart, ToolCallPartDelta,
};
pub use model_run::ModelRun;
pub use nodes::{CallToolsNode, EndNode, ModelRequestNode, Node, UserPromptNode};
pub use parts::PartsManager;
pub use run::{drain_run, AgentRun, AgentRunResult, NodeEventStream, RunContext};
pub use scripted::ScriptedRun;
