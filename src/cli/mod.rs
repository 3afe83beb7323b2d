//! CLI commands for the `crewgate` binary.
//!
//! ```text
//! crewgate tools [agent]                    list agents and their tools
//! crewgate check <agent> <capability>       print whether the agent is admitted
//! crewgate invoke <agent> <capability> [json-args]
//! crewgate ask <prompt...>                  ask the operator with a deadline
//! crewgate version
//! ```

use std::collections::HashMap;
use std::io::Write;

use anyhow::{bail, Context};
use serde_json::Value;

use crate::crew::Crew;
use crate::utilities::printer::{Printer, PrinterColor};
use crate::VERSION;

/// Available CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// List agents and the tools they may use.
    Tools,
    /// Check whether an agent is admitted to a capability.
    Check,
    /// Invoke a capability on behalf of an agent.
    Invoke,
    /// Ask the operator for a value with a deadline.
    Ask,
    /// Show version information.
    Version,
    /// Show usage.
    Help,
}

impl std::fmt::Display for CliCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tools => write!(f, "tools"),
            Self::Check => write!(f, "check"),
            Self::Invoke => write!(f, "invoke"),
            Self::Ask => write!(f, "ask"),
            Self::Version => write!(f, "version"),
            Self::Help => write!(f, "help"),
        }
    }
}

/// Parse a CLI command from a string.
pub fn parse_command(cmd: &str) -> Option<CliCommand> {
    match cmd {
        "tools" | "list" => Some(CliCommand::Tools),
        "check" => Some(CliCommand::Check),
        "invoke" | "call" => Some(CliCommand::Invoke),
        "ask" => Some(CliCommand::Ask),
        "version" | "--version" | "-v" => Some(CliCommand::Version),
        "help" | "--help" | "-h" => Some(CliCommand::Help),
        _ => None,
    }
}

pub const USAGE: &str = "\
Usage: crewgate <command> [args]

Commands:
  tools [agent]                          List agents and their admitted tools
  check <agent> <capability>             Check whether an agent may use a capability
  invoke <agent> <capability> [json]     Invoke a capability as an agent
  ask <prompt...>                        Ask the operator, falling back on timeout
  version                                Show version information

Environment:
  CREWGATE_CONFIG    crew config file (YAML, or JSON with a .json extension)
  CREWGATE_PROMPTS   JSON prompt book for agents using prompt_key
  RUST_LOG           log filter";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: CliCommand,
    pub args: Vec<String>,
}

impl Invocation {
    /// Parse arguments (without the program name). No arguments means help.
    pub fn parse<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let Some(first) = args.next() else {
            return Ok(Self {
                command: CliCommand::Help,
                args: Vec::new(),
            });
        };
        let command =
            parse_command(&first).with_context(|| format!("unknown command '{}'", first))?;
        let args: Vec<String> = args.collect();

        let (min, max) = match command {
            CliCommand::Tools => (0, Some(1)),
            CliCommand::Check => (2, Some(2)),
            CliCommand::Invoke => (2, Some(3)),
            CliCommand::Ask => (1, None),
            CliCommand::Version | CliCommand::Help => (0, Some(0)),
        };
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            bail!("wrong number of arguments for '{}'\n\n{}", command, USAGE);
        }
        Ok(Self { command, args })
    }

    /// Whether the command needs an assembled crew.
    pub fn needs_crew(&self) -> bool {
        !matches!(self.command, CliCommand::Version | CliCommand::Help)
    }
}

/// Print version and usage without touching configuration.
pub fn run_static<W: Write>(invocation: &Invocation, out: &mut W) -> anyhow::Result<()> {
    match invocation.command {
        CliCommand::Version => writeln!(out, "crewgate {}", VERSION)?,
        _ => writeln!(out, "{}", USAGE)?,
    }
    Ok(())
}

/// Run a command against an assembled crew.
pub async fn run<W: Write>(
    crew: &Crew,
    invocation: &Invocation,
    printer: Printer,
    out: &mut W,
) -> anyhow::Result<()> {
    let args = &invocation.args;
    match invocation.command {
        CliCommand::Tools => list_tools(crew, args.first().map(String::as_str), printer, out),
        CliCommand::Check => {
            let (agent, capability) = (&args[0], &args[1]);
            if crew.check(agent, capability) {
                printer.print_to(out, &format!("allowed: {} -> {}", agent, capability), PrinterColor::Green)?;
            } else {
                printer.print_to(out, &format!("denied: {} -> {}", agent, capability), PrinterColor::Red)?;
            }
            Ok(())
        }
        CliCommand::Invoke => {
            let tool_args = parse_tool_args(args.get(2).map(String::as_str))?;
            let result = crew.dispatch(&args[0], &args[1], tool_args).await?;
            match result {
                Value::String(text) => writeln!(out, "{}", text)?,
                other => writeln!(out, "{}", serde_json::to_string_pretty(&other)?)?,
            }
            Ok(())
        }
        CliCommand::Ask => {
            let prompt = format!("{} ", args.join(" "));
            let resolution = crew.ask(&prompt).await?;
            let color = if resolution.is_fallback() {
                PrinterColor::Yellow
            } else {
                PrinterColor::Green
            };
            printer.print_to(out, &resolution.into_inner(), color)?;
            Ok(())
        }
        CliCommand::Version | CliCommand::Help => run_static(invocation, out),
    }
}

fn list_tools<W: Write>(
    crew: &Crew,
    agent: Option<&str>,
    printer: Printer,
    out: &mut W,
) -> anyhow::Result<()> {
    let toolsets: Vec<_> = match agent {
        Some(name) => vec![crew
            .toolset(name)
            .with_context(|| format!("unknown agent '{}'", name))?],
        None => crew.toolsets().iter().collect(),
    };

    for toolset in toolsets {
        let patterns = crew
            .policy()
            .assignments()
            .patterns_for(&toolset.name)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "[]".to_string());
        printer.print_to(out, &format!("{} {}", toolset.name, patterns), PrinterColor::BoldCyan)?;
        if toolset.tools().is_empty() {
            writeln!(out, "  (no tools)")?;
        }
        for tool in toolset.tools() {
            writeln!(out, "  {:<32} {}", tool.name(), tool.description())?;
        }
    }
    Ok(())
}

fn parse_tool_args(raw: Option<&str>) -> anyhow::Result<HashMap<String, Value>> {
    match raw {
        None => Ok(HashMap::new()),
        Some(raw) => serde_json::from_str(raw)
            .with_context(|| format!("tool arguments must be a JSON object, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrewConfig;
    use crate::core::providers::human_input::TimeoutInputGate;
    use crate::core::providers::input_channel::ReplyInputChannel;
    use crate::core::providers::notices::CollectingNotices;
    use std::sync::Arc;

    fn crew() -> (tokio::sync::mpsc::Sender<String>, Crew) {
        let (tx, channel) = ReplyInputChannel::new(4);
        let gate = TimeoutInputGate::new(Arc::new(channel), Arc::new(CollectingNotices::new()));
        let mut config = CrewConfig::default_crew().unwrap();
        config.input.timeout_secs = 0.05;
        (tx, Crew::assemble(config, None, gate).unwrap())
    }

    async fn run_to_string(crew: &Crew, args: &[&str]) -> anyhow::Result<String> {
        let invocation = Invocation::parse(args.iter().copied())?;
        let mut out = Vec::new();
        run(crew, &invocation, Printer::plain(), &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("tools"), Some(CliCommand::Tools));
        assert_eq!(parse_command("call"), Some(CliCommand::Invoke));
        assert_eq!(parse_command("-v"), Some(CliCommand::Version));
        assert_eq!(parse_command("serve"), None);
    }

    #[test]
    fn test_parse_invocation() {
        let empty: [&str; 0] = [];
        assert_eq!(Invocation::parse(empty).unwrap().command, CliCommand::Help);

        let inv = Invocation::parse(["check", "quality_checker", "quality.create_checklist"]).unwrap();
        assert_eq!(inv.command, CliCommand::Check);
        assert!(inv.needs_crew());

        assert!(Invocation::parse(["check", "quality_checker"]).is_err());
        assert!(Invocation::parse(["version", "extra"]).is_err());
        assert!(Invocation::parse(["launch"]).is_err());
    }

    #[test]
    fn test_version() {
        let inv = Invocation::parse(["version"]).unwrap();
        assert!(!inv.needs_crew());
        let mut out = Vec::new();
        run_static(&inv, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("crewgate {}\n", VERSION));
    }

    #[tokio::test]
    async fn test_tools_and_check() {
        let (_tx, crew) = crew();
        let listing = run_to_string(&crew, &["tools", "quality_checker"]).await.unwrap();
        assert!(listing.starts_with("quality_checker [quality.*]\n"));
        assert!(listing.contains("quality.create_checklist"));
        assert!(!listing.contains("event.plan_event"));

        let allowed = run_to_string(&crew, &["check", "event_coordinator", "event.plan_event"])
            .await
            .unwrap();
        assert_eq!(allowed, "allowed: event_coordinator -> event.plan_event\n");

        let denied = run_to_string(&crew, &["check", "event_coordinator", "fundraising.create_plan"])
            .await
            .unwrap();
        assert!(denied.starts_with("denied"));

        assert!(run_to_string(&crew, &["tools", "nobody"]).await.is_err());
    }

    #[tokio::test]
    async fn test_invoke() {
        let (_tx, crew) = crew();
        let out = run_to_string(
            &crew,
            &[
                "invoke",
                "quality_checker",
                "quality.create_checklist",
                r#"{"project_type": "event"}"#,
            ],
        )
        .await
        .unwrap();
        assert!(out.starts_with("Quality Checklist for Event Project:"));

        let err = run_to_string(&crew, &["invoke", "quality_checker", "db.query"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not admitted"));

        assert!(run_to_string(&crew, &["invoke", "quality_checker", "quality.create_checklist", "[1]"])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_ask() {
        let (tx, crew) = crew();
        tx.send("Grace".to_string()).await.unwrap();
        let answered = run_to_string(&crew, &["ask", "Your", "name?"]).await.unwrap();
        assert_eq!(answered, "Grace\n");

        let fallback = run_to_string(&crew, &["ask", "Your", "name?"]).await.unwrap();
        assert_eq!(fallback, "Anonymous User\n");
    }
}
