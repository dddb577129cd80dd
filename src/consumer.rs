//! Streaming event consumer.
//!
//! Walks an [`AgentRun`] node by node, drains the inner event stream of every
//! model request and call-tools node, and turns each event into a line in an
//! [`OutputLog`]. Streamed text and tool call notices are echoed to a
//! [`Console`] as they arrive. The consumer only observes; it never changes
//! what the run does, and any failure from either stream level is returned
//! to the caller as is.

use crate::agent::events::{HandleResponseEvent, ModelResponseEvent};
use crate::agent::messages::PartDelta;
use crate::agent::nodes::{CallToolsNode, EndNode, ModelRequestNode, Node};
use crate::agent::run::AgentRun;
use crate::error::{AgentStreamError, Result};
use futures::stream::StreamExt;
use std::io::Write;
use tracing::debug;

/// Ordered, append-only record of everything the consumer observed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputLog {
    entries: Vec<String>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!(entry = %entry, "output log");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

/// Destination for live output
pub trait Console: Send {
    /// Write `text` exactly as given, with no separator, and flush
    fn write(&mut self, text: &str) -> Result<()>;

    fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.write("\n")
    }
}

/// Console backed by the process's standard output
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Console that records every write, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedConsole {
    writes: Vec<String>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Everything written, concatenated
    pub fn transcript(&self) -> String {
        self.writes.concat()
    }
}

impl Console for CapturedConsole {
    fn write(&mut self, text: &str) -> Result<()> {
        self.writes.push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerOptions {
    /// Log and print the final output at the end node, after checking it
    /// against the run's reported result. Off by default.
    pub report_final_output: bool,
}

pub struct StreamConsumer<'s, C: Console + ?Sized> {
    log: &'s mut OutputLog,
    console: &'s mut C,
    options: ConsumerOptions,
}

impl<'s, C: Console + ?Sized> StreamConsumer<'s, C> {
    pub fn new(log: &'s mut OutputLog, console: &'s mut C) -> Self {
        Self {
            log,
            console,
            options: ConsumerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConsumerOptions) -> Self {
        self.options = options;
        self
    }

    /// Drive `run` to completion, recording every node and event
    pub async fn consume<R: AgentRun + ?Sized>(&mut self, run: &mut R) -> Result<()> {
        while let Some(node) = run.next_node().await? {
            match node {
                Node::UserPrompt(prompt) => {
                    self.log.push(format!("=== UserPromptNode: {} ===", prompt.user_prompt));
                }
                Node::ModelRequest(request) => self.consume_model_request(run, &request).await?,
                Node::CallTools(call_tools) => self.consume_call_tools(run, &call_tools).await?,
                Node::End(end) => self.consume_end(run, &end)?,
            }
        }
        Ok(())
    }

    async fn consume_model_request<R: AgentRun + ?Sized>(
        &mut self,
        run: &mut R,
        node: &ModelRequestNode,
    ) -> Result<()> {
        self.log.push("=== ModelRequestNode: streaming partial request tokens ===");

        let mut events = run.stream_model_request(node);
        while let Some(event) = events.next().await {
            self.on_model_event(event?)?;
        }
        Ok(())
    }

    fn on_model_event(&mut self, event: ModelResponseEvent) -> Result<()> {
        match event {
            ModelResponseEvent::PartStart(start) => {
                self.log
                    .push(format!("[Request] Starting part {}: {}", start.index, start.part));
                if let Some(content) = start.part.content().filter(|c| !c.is_empty()) {
                    self.console.write(content)?;
                }
            }
            ModelResponseEvent::PartEnd(end) => {
                self.log.push(format!("[Request] Ending part {}: {}", end.index, end.part));
                if end.part.content().is_some_and(|c| !c.is_empty()) {
                    self.console.write_line("Part end event")?;
                }
            }
            ModelResponseEvent::PartDelta(delta) => match delta.delta {
                PartDelta::Text(text) => {
                    self.log.push(format!(
                        "[Request] Part {} text delta: {:?}",
                        delta.index, text.content_delta
                    ));
                    self.console.write(&text.content_delta)?;
                }
                PartDelta::Thinking(thinking) => {
                    self.log.push(format!(
                        "[Request] Part {} thinking delta: {:?}",
                        delta.index, thinking.content_delta
                    ));
                }
                PartDelta::ToolCall(args) => {
                    self.log.push(format!(
                        "[Request] Part {} args delta: {}",
                        delta.index, args.args_delta
                    ));
                }
            },
            ModelResponseEvent::FinalResult(result) => {
                let tool_name = result.tool_name.as_deref().unwrap_or("None");
                self.log.push(format!(
                    "[Result] The model started producing a final result (tool_name={})",
                    tool_name
                ));
            }
        }
        Ok(())
    }

    async fn consume_call_tools<R: AgentRun + ?Sized>(
        &mut self,
        run: &mut R,
        node: &CallToolsNode,
    ) -> Result<()> {
        self.log.push("=== CallToolsNode: streaming partial response & tool usage ===");

        let mut events = run.stream_call_tools(node);
        while let Some(event) = events.next().await {
            self.on_tool_event(event?)?;
        }
        Ok(())
    }

    fn on_tool_event(&mut self, event: HandleResponseEvent) -> Result<()> {
        match event {
            HandleResponseEvent::FunctionToolCall(call) => {
                let line = format!(
                    "[Tools] The LLM calls tool={:?} with args={} (tool_call_id={:?})",
                    call.part.tool_name, call.part.args, call.part.tool_call_id
                );
                self.console.write_line(&format!("\n {}", line))?;
                self.log.push(line);
            }
            HandleResponseEvent::FunctionToolResult(result) => {
                self.log.push(format!(
                    "[Tools] Tool call {:?} returned => {}",
                    result.tool_call_id, result.result.content
                ));
            }
        }
        Ok(())
    }

    fn consume_end<R: AgentRun + ?Sized>(&mut self, run: &R, node: &EndNode) -> Result<()> {
        if !self.options.report_final_output {
            return Ok(());
        }

        let reported = run.result().map(|result| result.output.clone());
        if reported.as_deref() != Some(node.output.as_str()) {
            return Err(AgentStreamError::OutputMismatch {
                node: node.output.clone(),
                reported,
            });
        }

        self.log.push(format!("=== Final Agent Output: {} ===", node.output));
        self.console.write_line(&node.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::events::{PartDeltaEvent, PartStartEvent};
    use crate::agent::messages::{Part, ThinkingPart, ThinkingPartDelta};
    use crate::agent::scripted::{
        args_delta, text_delta, text_end, text_start, tool_call, tool_call_start, tool_result,
        ScriptedRun,
    };

    async fn consume(run: &mut ScriptedRun) -> (OutputLog, CapturedConsole) {
        let mut log = OutputLog::new();
        let mut console = CapturedConsole::new();
        StreamConsumer::new(&mut log, &mut console).consume(run).await.unwrap();
        (log, console)
    }

    fn paris_run() -> ScriptedRun {
        ScriptedRun::new()
            .user_prompt("What will the weather be like in Paris on Tuesday?")
            .model_request(vec![
                tool_call_start(0, "weather_forecast", "0001"),
                args_delta(0, r#"{"location":"Pa"#),
                args_delta(0, r#"ris","forecast_date":"2030-01-01"}"#),
            ])
            .call_tools(vec![
                tool_call(
                    "weather_forecast",
                    r#"{"location":"Paris","forecast_date":"2030-01-01"}"#,
                    "0001",
                ),
                tool_result(
                    "weather_forecast",
                    "0001",
                    "The forecast in Paris on 2030-01-01 is 24°C and sunny.",
                ),
            ])
            .model_request(vec![
                text_start(0, "It will be "),
                text_delta(0, "warm and sunny."),
                text_end(0, "It will be warm and sunny."),
            ])
            .call_tools(vec![])
            .end("It will be warm and sunny.")
    }

    #[tokio::test]
    async fn test_user_prompt_produces_one_entry() {
        let mut run = ScriptedRun::new().user_prompt("X");
        let (log, console) = consume(&mut run).await;

        assert_eq!(log.entries(), ["=== UserPromptNode: X ==="]);
        assert!(console.writes().is_empty());
    }

    #[tokio::test]
    async fn test_text_deltas_stream_to_console_without_separators() {
        let mut run =
            ScriptedRun::new().model_request(vec![text_delta(0, "Hel"), text_delta(0, "lo")]);
        let (log, console) = consume(&mut run).await;

        let payloads: String = log
            .entries()
            .iter()
            .filter_map(|entry| entry.strip_prefix("[Request] Part 0 text delta: "))
            .map(|quoted| quoted.trim_matches('"'))
            .collect();
        assert_eq!(payloads, "Hello");
        assert_eq!(console.writes(), ["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_tool_call_logged_before_result() {
        let mut run = ScriptedRun::new().call_tools(vec![
            tool_call("weather_forecast", r#"{"location":"Paris"}"#, "0001"),
            tool_result("weather_forecast", "0001", "sunny"),
        ]);
        let (log, console) = consume(&mut run).await;

        assert_eq!(
            log.entries(),
            [
                "=== CallToolsNode: streaming partial response & tool usage ===",
                r#"[Tools] The LLM calls tool="weather_forecast" with args={"location":"Paris"} (tool_call_id="0001")"#,
                r#"[Tools] Tool call "0001" returned => sunny"#,
            ]
        );
        assert_eq!(console.writes().len(), 2);
        assert!(console.transcript().contains("[Tools] The LLM calls tool=\"weather_forecast\""));
        assert!(!console.transcript().contains("sunny"));
    }

    #[tokio::test]
    async fn test_replay_is_byte_identical() {
        let script = paris_run();

        let (first, first_console) = consume(&mut script.clone()).await;
        let (second, second_console) = consume(&mut script.clone()).await;

        assert_eq!(first, second);
        assert_eq!(first_console, second_console);
    }

    #[tokio::test]
    async fn test_empty_run_produces_nothing() {
        let mut run = ScriptedRun::new();
        let (log, console) = consume(&mut run).await;

        assert!(log.is_empty());
        assert!(console.writes().is_empty());
    }

    #[tokio::test]
    async fn test_full_run_log() {
        let mut run = paris_run();
        let (log, console) = consume(&mut run).await;

        assert_eq!(
            log.entries(),
            [
                "=== UserPromptNode: What will the weather be like in Paris on Tuesday? ===",
                "=== ModelRequestNode: streaming partial request tokens ===",
                r#"[Request] Starting part 0: ToolCallPart(tool_name="weather_forecast", args="", tool_call_id="0001")"#,
                r#"[Request] Part 0 args delta: {"location":"Pa"#,
                r#"[Request] Part 0 args delta: ris","forecast_date":"2030-01-01"}"#,
                "=== CallToolsNode: streaming partial response & tool usage ===",
                r#"[Tools] The LLM calls tool="weather_forecast" with args={"location":"Paris","forecast_date":"2030-01-01"} (tool_call_id="0001")"#,
                r#"[Tools] Tool call "0001" returned => The forecast in Paris on 2030-01-01 is 24°C and sunny."#,
                "=== ModelRequestNode: streaming partial request tokens ===",
                r#"[Request] Starting part 0: TextPart(content="It will be ")"#,
                r#"[Request] Part 0 text delta: "warm and sunny.""#,
                r#"[Request] Ending part 0: TextPart(content="It will be warm and sunny.")"#,
                "=== CallToolsNode: streaming partial response & tool usage ===",
            ]
        );
        assert!(console
            .transcript()
            .ends_with("It will be warm and sunny.Part end event\n"));
    }

    #[tokio::test]
    async fn test_tool_call_part_start_is_not_echoed() {
        let mut run =
            ScriptedRun::new().model_request(vec![tool_call_start(0, "get_weather", "0001")]);
        let (_, console) = consume(&mut run).await;

        assert!(console.writes().is_empty());
    }

    #[tokio::test]
    async fn test_end_node_is_inert_by_default() {
        let mut run = ScriptedRun::new().end("done").reporting_output("different");
        let (log, console) = consume(&mut run).await;

        assert!(log.is_empty());
        assert!(console.writes().is_empty());
    }

    #[tokio::test]
    async fn test_end_node_reports_final_output_when_enabled() {
        let mut run = ScriptedRun::new().end("It will be sunny.");
        let mut log = OutputLog::new();
        let mut console = CapturedConsole::new();

        StreamConsumer::new(&mut log, &mut console)
            .with_options(ConsumerOptions {
                report_final_output: true,
            })
            .consume(&mut run)
            .await
            .unwrap();

        assert_eq!(log.entries(), ["=== Final Agent Output: It will be sunny. ==="]);
        assert_eq!(console.transcript(), "It will be sunny.\n");
    }

    #[tokio::test]
    async fn test_end_node_output_mismatch_is_an_error() {
        let mut run = ScriptedRun::new().end("node says").reporting_output("run says");
        let mut log = OutputLog::new();
        let mut console = CapturedConsole::new();

        let err = StreamConsumer::new(&mut log, &mut console)
            .with_options(ConsumerOptions {
                report_final_output: true,
            })
            .consume(&mut run)
            .await
            .unwrap_err();

        assert!(matches!(err, AgentStreamError::OutputMismatch { .. }));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_stream_failure_propagates_and_keeps_partial_log() {
        let mut run = ScriptedRun::new()
            .user_prompt("X")
            .failing_model_request(vec![text_start(0, "par")], "model went away")
            .end("never reached");
        let mut log = OutputLog::new();
        let mut console = CapturedConsole::new();

        let err = StreamConsumer::new(&mut log, &mut console)
            .consume(&mut run)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Run error: model went away");
        assert_eq!(log.len(), 3);
        assert_eq!(console.writes(), ["par"]);
        assert!(run.result().is_none());
    }

    #[tokio::test]
    async fn test_independent_consumers_run_concurrently() {
        let first = tokio::spawn(async {
            let mut run = paris_run();
            consume(&mut run).await.0
        });
        let second = tokio::spawn(async {
            let mut run = paris_run();
            consume(&mut run).await.0
        });

        let (first, second) = (first.await.unwrap(), second.await.unwrap());
        assert_eq!(first, second);
        assert_eq!(first.len(), 13);
    }

    #[tokio::test]
    async fn test_thinking_start_echoes_but_delta_does_not() {
        let mut run = ScriptedRun::new().model_request(vec![
            ModelResponseEvent::PartStart(PartStartEvent {
                index: 0,
                part: Part::Thinking(ThinkingPart {
                    content: "Let me check".to_string(),
                }),
            }),
            ModelResponseEvent::PartDelta(PartDeltaEvent {
                index: 0,
                delta: PartDelta::Thinking(ThinkingPartDelta {
                    content_delta: " the forecast".to_string(),
                }),
            }),
        ]);
        let (log, console) = consume(&mut run).await;

        assert_eq!(
            log.entries(),
            [
                "=== ModelRequestNode: streaming partial request tokens ===",
                r#"[Request] Starting part 0: ThinkingPart(content="Let me check")"#,
                r#"[Request] Part 0 thinking delta: " the forecast""#,
            ]
        );
        assert_eq!(console.writes(), ["Let me check"]);
    }

    #[tokio::test]
    async fn test_tool_failure_propagates_and_keeps_call_entry() {
        let mut run = ScriptedRun::new()
            .call_tools(vec![])
            .failing_call_tools(
                vec![tool_call("weather_forecast", r#"{"location":"Paris"}"#, "0001")],
                "boom",
            )
            .end("never reached");
        let mut log = OutputLog::new();
        let mut console = CapturedConsole::new();

        let err = StreamConsumer::new(&mut log, &mut console)
            .consume(&mut run)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Run error: boom");
        assert_eq!(
            log.entries().last().map(String::as_str),
            Some(
                r#"[Tools] The LLM calls tool="weather_forecast" with args={"location":"Paris"} (tool_call_id="0001")"#
            )
        );
        assert!(!log.entries().iter().any(|e| e.contains("returned =>")));
        assert!(run.result().is_none());
    }

    #[test]
    fn test_unknown_lookup_key_falls_back() {
        assert_eq!(
            crate::tools::assistant_tools::lookup_database("rust"),
            "No results found for 'rust'"
        );
    }
}
