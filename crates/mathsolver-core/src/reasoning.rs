//! Reasoning Loop
//!
//! Implements the zero-shot ReAct (Reason + Act) protocol: the model is shown
//! the tool list and a fixed text format, and on each iteration it either
//! names a tool to call or gives the final answer.
//!
//! The loop sits behind the `DecisionLoop` trait so the dispatcher never
//! depends on the selection policy itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::event::{AgentEvent, AgentRun, AgentStep, EventSink};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::ToolRegistry;
use crate::transcript::Transcript;

/// Answer returned when the step ceiling is hit
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// Tool name recorded for a recovered parse error
pub const EXCEPTION_TOOL: &str = "_Exception";

const PREFIX: &str =
    "Answer the following questions as best you can. You have access to the following tools:";

const FORMAT_INSTRUCTIONS: &str = "Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question";

const SUFFIX: &str = "Begin!

Question: {input}
Thought:{agent_scratchpad}";

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";

const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
const INCOMPLETE_RESPONSE: &str = "Invalid or incomplete response";
const MISSING_FINAL_ANSWER: &str = "Invalid Format: Missing text after 'Final Answer:'";

const STOP: [&str; 2] = ["\nObservation:", "\n\tObservation:"];

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum reasoning iterations before the turn is force-stopped
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            generation: GenerationOptions::default(),
        }
    }
}

/// Chooses tools and produces the final answer for one input.
#[async_trait]
pub trait DecisionLoop: Send + Sync {
    async fn run(&self, input: &str, tools: &ToolRegistry, events: &EventSink)
    -> Result<AgentRun>;
}

/// What one model reply asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactDecision {
    Action { tool: String, input: String },
    Finish(String),
}

/// Why a model reply could not be parsed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactParseError {
    /// Text fed back to the model as the next observation
    pub observation: String,
}

/// Parse one ReAct-formatted reply
pub fn parse_react_output(text: &str) -> std::result::Result<ReactDecision, ReactParseError> {
    let includes_answer = text.contains(FINAL_ANSWER);

    let action = text.find(ACTION).and_then(|start| {
        let after = &text[start + ACTION.len()..];
        after.find(ACTION_INPUT).map(|input_at| {
            let tool = after[..input_at].trim().to_string();
            let input = after[input_at + ACTION_INPUT.len()..]
                .trim()
                .trim_matches('"')
                .to_string();
            (tool, input)
        })
    });

    match action {
        Some(_) if includes_answer => Err(ReactParseError {
            observation: INCOMPLETE_RESPONSE.into(),
        }),
        Some((tool, input)) => Ok(ReactDecision::Action { tool, input }),
        None if includes_answer => {
            let answer = text.rsplit(FINAL_ANSWER).next().unwrap_or_default().trim();
            if answer.is_empty() {
                return Err(ReactParseError {
                    observation: MISSING_FINAL_ANSWER.into(),
                });
            }
            Ok(ReactDecision::Finish(answer.to_string()))
        }
        None if !text.contains(ACTION) => Err(ReactParseError {
            observation: MISSING_ACTION.into(),
        }),
        None => Err(ReactParseError {
            observation: MISSING_ACTION_INPUT.into(),
        }),
    }
}

/// Default `DecisionLoop`: zero-shot ReAct over a language model
pub struct ReactLoop {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl ReactLoop {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    /// Build the full prompt for the current scratchpad
    pub fn build_prompt(tools: &ToolRegistry, input: &str, steps: &[AgentStep]) -> String {
        let instructions = FORMAT_INSTRUCTIONS.replace("{tool_names}", &tools.names().join(", "));
        let scratchpad = Self::scratchpad(steps);
        let suffix = SUFFIX
            .replace("{input}", input)
            .replace("{agent_scratchpad}", &scratchpad);

        format!("{PREFIX}\n\n{}\n\n{instructions}\n\n{suffix}", tools.describe())
    }

    fn scratchpad(steps: &[AgentStep]) -> String {
        steps
            .iter()
            .map(|step| format!("{}\nObservation: {}\nThought: ", step.log, step.observation))
            .collect()
    }

    async fn observe(
        &self,
        tools: &ToolRegistry,
        tool: &str,
        input: &str,
        events: &EventSink,
    ) -> Result<String> {
        if tools.get(tool).is_none() {
            let observation = format!(
                "{tool} is not a valid tool, try one of [{}].",
                tools.names().join(", ")
            );
            tracing::warn!(tool = %tool, "Model selected an unknown tool");
            return Ok(observation);
        }

        events.emit(AgentEvent::ToolStart {
            tool: tool.to_string(),
            input: input.to_string(),
        });
        let output = tools.invoke(tool, input).await?;
        events.emit(AgentEvent::ToolEnd {
            tool: tool.to_string(),
            output: output.clone(),
        });
        Ok(output)
    }
}

#[async_trait]
impl DecisionLoop for ReactLoop {
    async fn run(
        &self,
        input: &str,
        tools: &ToolRegistry,
        events: &EventSink,
    ) -> Result<AgentRun> {
        let options = self.config.generation.clone().with_stop(&STOP);
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            let prompt = Self::build_prompt(tools, input, &steps);
            let output = self.provider.complete_prompt(&prompt, &options).await?;
            tracing::debug!(iteration, provider = self.provider.name(), "Model replied");

            events.emit(AgentEvent::Thought { text: output.clone() });

            match parse_react_output(&output) {
                Ok(ReactDecision::Finish(answer)) => {
                    events.emit(AgentEvent::Finish { answer: answer.clone() });
                    return Ok(AgentRun { answer, steps });
                }
                Ok(ReactDecision::Action { tool, input: tool_input }) => {
                    let observation = self.observe(tools, &tool, &tool_input, events).await?;
                    steps.push(AgentStep {
                        tool,
                        tool_input,
                        log: output,
                        observation,
                    });
                }
                Err(err) => {
                    tracing::warn!(iteration, observation = %err.observation, "Recovering from unparsable reply");
                    events.emit(AgentEvent::ParseError {
                        observation: err.observation.clone(),
                    });
                    steps.push(AgentStep {
                        tool: EXCEPTION_TOOL.into(),
                        tool_input: err.observation.clone(),
                        log: output,
                        observation: err.observation,
                    });
                }
            }
        }

        tracing::warn!(max = self.config.max_iterations, "Iteration limit reached");
        events.emit(AgentEvent::Finish {
            answer: ITERATION_LIMIT_ANSWER.into(),
        });
        Ok(AgentRun {
            answer: ITERATION_LIMIT_ANSWER.into(),
            steps,
        })
    }
}

/// The dispatcher: transcript in, final answer out
pub struct Agent {
    decision_loop: Arc<dyn DecisionLoop>,
    tools: Arc<ToolRegistry>,
}

impl Agent {
    /// Create a new agent
    pub fn new(decision_loop: Arc<dyn DecisionLoop>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            decision_loop,
            tools,
        }
    }

    /// Answer the latest question given the whole transcript
    pub async fn run(&self, transcript: &Transcript, events: &EventSink) -> Result<AgentRun> {
        let input = transcript.to_agent_input();
        tracing::info!(messages = transcript.len(), "Dispatching turn");

        let run = self.decision_loop.run(&input, &self.tools, events).await?;
        tracing::info!(steps = run.steps.len(), "Turn answered");
        Ok(run)
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    decision_loop: Option<Arc<dyn DecisionLoop>>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            decision_loop: None,
            tools: Arc::new(ToolRegistry::new()),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the default ReAct loop
    #[must_use]
    pub fn decision_loop(mut self, decision_loop: Arc<dyn DecisionLoop>) -> Self {
        self.decision_loop = Some(decision_loop);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let decision_loop = match (self.decision_loop, self.provider) {
            (Some(decision_loop), _) => decision_loop,
            (None, Some(provider)) => Arc::new(ReactLoop::new(provider, self.config)),
            (None, None) => {
                return Err(AgentError::Config("Provider is required".into()));
            }
        };

        Ok(Agent::new(decision_loop, self.tools))
    }
}
