//! Interactive prompt loop
//!
//! Lines starting with `/` are commands handled locally; anything else goes
//! to the agent when one is configured.

use crate::agent::{AgentResponse, MemoryAgent};
use crate::session::ToolExecutor;
use crate::Result;
use owo_colors::OwoColorize;
use serde_json::Value;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const PROMPT: &str = "You> ";

pub const HELP: &str = "Commands:
  /tools                 list the server's tools
  /call <tool> [json]    call a tool directly, e.g. /call search_memories {\"query\": \"tea\"}
  /clear                 forget the agent conversation
  /help                  show this message
  exit | quit            leave";

const NO_AGENT_HINT: &str =
    "No LLM configured. Set OPENAI_API_KEY to chat with the agent; /tools and /call still work.";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Empty,
    Exit,
    Help,
    Tools,
    Clear,
    Call { tool: String, arguments: Value },
    Prompt(String),
    /// Unusable input, with the message to show
    Invalid(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if matches!(line.to_lowercase().as_str(), "exit" | "quit") {
        return Command::Exit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Prompt(line.to_string());
    };

    let (name, args) = rest
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((rest, ""));

    match name {
        "help" => Command::Help,
        "tools" => Command::Tools,
        "clear" => Command::Clear,
        "exit" | "quit" => Command::Exit,
        "call" => parse_call(args),
        other => Command::Invalid(format!("Unknown command /{other}. Try /help.")),
    }
}

fn parse_call(args: &str) -> Command {
    let (tool, raw) = args
        .split_once(char::is_whitespace)
        .map(|(t, r)| (t, r.trim()))
        .unwrap_or((args, ""));

    if tool.is_empty() {
        return Command::Invalid("Usage: /call <tool> [json]".to_string());
    }
    if raw.is_empty() {
        return Command::Call {
            tool: tool.to_string(),
            arguments: Value::Object(Default::default()),
        };
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(arguments @ Value::Object(_)) => Command::Call {
            tool: tool.to_string(),
            arguments,
        },
        Ok(_) => Command::Invalid("Tool arguments must be a JSON object".to_string()),
        Err(e) => Command::Invalid(format!("Invalid JSON arguments: {e}")),
    }
}

/// Pretty-print JSON output, pass anything else through.
fn pretty(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| text.to_string())
}

fn summarize(response: &AgentResponse) -> String {
    let mut out = response.content.clone();
    if !response.tool_calls.is_empty() {
        out.push_str("\n\nTool calls made:");
        for tc in &response.tool_calls {
            let status = if tc.success { "✓" } else { "✗" };
            out.push_str(&format!("\n  {} {} ({}ms)", status, tc.name, tc.duration_ms));
        }
    }
    out
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Print(String),
    Reply(String),
    Error(String),
    Exit,
}

pub struct Repl<E: ToolExecutor> {
    executor: E,
    agent: Option<MemoryAgent>,
}

impl<E: ToolExecutor> Repl<E> {
    pub fn new(executor: E, agent: Option<MemoryAgent>) -> Self {
        Self { executor, agent }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    pub fn banner(&self) -> String {
        let model = self
            .agent
            .as_ref()
            .map(|a| a.model().to_string())
            .unwrap_or_else(|| "none (set OPENAI_API_KEY)".to_string());
        let tools: Vec<String> = self.executor.specs().into_iter().map(|s| s.name).collect();

        format!(
            "Mem0 agent ready. Type a prompt or 'exit' to quit.\n\nModel: {}\nTools: Mem0 MCP ({})\nType /help for commands.\n",
            model,
            tools.join(", ")
        )
    }

    pub async fn handle(&mut self, command: Command) -> Outcome {
        match command {
            Command::Empty => Outcome::Continue,
            Command::Exit => Outcome::Exit,
            Command::Help => Outcome::Print(HELP.to_string()),
            Command::Invalid(msg) => Outcome::Error(msg),
            Command::Tools => {
                let lines: Vec<String> = self
                    .executor
                    .specs()
                    .iter()
                    .map(|s| {
                        let summary = s.description.lines().next().unwrap_or_default();
                        format!("  {:<22} {}", s.name, summary)
                    })
                    .collect();
                Outcome::Print(lines.join("\n"))
            }
            Command::Clear => {
                if let Some(agent) = self.agent.as_mut() {
                    agent.clear_history();
                }
                Outcome::Print("History cleared.".to_string())
            }
            Command::Call { tool, arguments } => {
                match self.executor.call(&tool, arguments).await {
                    Ok(text) => Outcome::Print(pretty(&text)),
                    Err(e) => Outcome::Error(e.to_string()),
                }
            }
            Command::Prompt(prompt) => match self.agent.as_mut() {
                None => Outcome::Error(NO_AGENT_HINT.to_string()),
                Some(agent) => match agent.execute(&prompt, &self.executor).await {
                    Ok(response) => Outcome::Reply(summarize(&response)),
                    Err(e) => Outcome::Error(e.to_string()),
                },
            },
        }
    }

    /// Read stdin until `exit`, `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", self.banner());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = std::io::stdout();

        loop {
            print!("{}", PROMPT.cyan().bold());
            stdout.flush()?;

            let Some(line) = lines.next_line().await? else {
                println!("\nBye!");
                return Ok(());
            };

            match self.handle(parse_line(&line)).await {
                Outcome::Continue => {}
                Outcome::Exit => {
                    println!("Bye!");
                    return Ok(());
                }
                Outcome::Print(text) => println!("{}\n", text),
                Outcome::Reply(text) => println!("\n{} {}\n", "Agent>".green().bold(), text),
                Outcome::Error(msg) => println!("{} {}\n", "Error:".red().bold(), msg),
            }
        }
    }
}
