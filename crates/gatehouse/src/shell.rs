// SPDX-FileCopyrightText: 2026 Gatehouse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gatehouse shell` command implementation.
//!
//! A readline REPL that drives requests through the limiter and the context
//! store. Replies come from an offline echo generator, so the shell is useful
//! for tuning thresholds and inspecting memory without a model backend.

use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use gatehouse_agent::{Gatehouse, Outcome, throttle_message};
use gatehouse_config::GatehouseConfig;
use gatehouse_core::{
    ActorId, Category, ContextMessage, GatehouseError, Generator, GeneratorError, ScopeId,
    SystemClock,
};
use gatehouse_limiter::LimitReport;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Replies by echoing the prompt along with how much context it was given.
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(
        &self,
        prompt: &str,
        prior_turns: &[ContextMessage],
    ) -> Result<String, GeneratorError> {
        Ok(format!("echo ({} prior turns): {prompt}", prior_turns.len()))
    }
}

/// One parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand<'a> {
    Say { category: Category, text: &'a str },
    Stats,
    Memory,
    Clear { all_scopes: bool },
    Export,
    Import(&'a str),
    Reset(Option<Category>),
    Scope(Option<&'a str>),
    Actor(&'a str),
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> ShellCommand<'_> {
    let Some(rest) = line.strip_prefix('/') else {
        return ShellCommand::Say {
            category: Category::Chat,
            text: line,
        };
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "chat" | "ask" | "moderate" => {
            if arg.is_empty() {
                return ShellCommand::Invalid(format!("/{name} needs a message"));
            }
            // The arm only matches valid category names.
            let category = name.parse().unwrap_or(Category::Chat);
            ShellCommand::Say { category, text: arg }
        }
        "stats" => ShellCommand::Stats,
        "memory" => ShellCommand::Memory,
        "clear" => ShellCommand::Clear {
            all_scopes: arg == "all",
        },
        "export" => ShellCommand::Export,
        "import" if !arg.is_empty() => ShellCommand::Import(arg),
        "import" => ShellCommand::Invalid("/import needs a file path".into()),
        "reset" if arg.is_empty() => ShellCommand::Reset(None),
        "reset" => match arg.parse() {
            Ok(category) => ShellCommand::Reset(Some(category)),
            Err(_) => ShellCommand::Invalid(format!("unknown category '{arg}'")),
        },
        "scope" => ShellCommand::Scope((!arg.is_empty()).then_some(arg)),
        "actor" if !arg.is_empty() => ShellCommand::Actor(arg),
        "actor" => ShellCommand::Invalid("/actor needs an id".into()),
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command '/{other}', try /help")),
    }
}

struct ShellState {
    gatehouse: Gatehouse,
    actor: ActorId,
    scope: ScopeId,
}

/// Runs the `gatehouse shell` REPL.
pub async fn run_shell(
    config: GatehouseConfig,
    actor: String,
    scope: Option<String>,
) -> Result<(), GatehouseError> {
    crate::serve::init_tracing("warn");

    let mut state = ShellState {
        gatehouse: Gatehouse::from_config(&config, Arc::new(SystemClock)),
        actor: ActorId(actor),
        scope: scope.map(ScopeId::named).unwrap_or(ScopeId::Unscoped),
    };

    let mut rl = DefaultEditor::new()
        .map_err(|e| GatehouseError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "gatehouse shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    loop {
        let prompt = format!("{}@{}> ", state.actor.to_string().green(), state.scope);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_command(trimmed) {
                    ShellCommand::Quit => break,
                    command => {
                        if let Err(e) = handle_command(&mut state, command).await {
                            eprintln!("{}: {e}", "error".red());
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn handle_command(state: &mut ShellState, command: ShellCommand<'_>) -> Result<(), GatehouseError> {
    let gh = &state.gatehouse;
    match command {
        ShellCommand::Say { category, text } => {
            match gh
                .converse(&state.actor, &state.scope, category, text, &EchoGenerator)
                .await?
            {
                Outcome::Replied(reply) => println!("{reply}"),
                Outcome::Throttled { retry_after } => {
                    println!("{}", throttle_message(retry_after).yellow());
                }
            }
        }
        ShellCommand::Stats => {
            let report = gh.limiter().stats(&state.actor);
            println!("{}", format_limit("global", &report.global));
            for entry in &report.categories {
                println!("{}", format_limit(&entry.category.to_string(), &entry.limit));
            }
            let bucket = gh.store().stats(&state.actor, &state.scope);
            println!(
                "memory   {} turns ({} user, {} assistant)",
                bucket.total_turns, bucket.user_turns, bucket.assistant_turns
            );
        }
        ShellCommand::Memory => {
            let stats = gh.store().global_stats();
            println!(
                "{} actors, {} scopes, {} turns (max {} per scope, retention {}h)",
                stats.actors,
                stats.scopes,
                stats.turns,
                stats.max_turns,
                stats.retention.as_secs() / 3600
            );
        }
        ShellCommand::Clear { all_scopes } => {
            let scope = (!all_scopes).then_some(&state.scope);
            gh.store().clear(&state.actor, scope);
            println!("{}", "memory cleared".dimmed());
        }
        ShellCommand::Export => {
            println!("{}", gh.store().export_json(&state.actor, &state.scope)?);
        }
        ShellCommand::Import(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| GatehouseError::Internal(format!("failed to read {path}: {e}")))?;
            let report = gh.store().import_json(&state.actor, &state.scope, &json)?;
            println!(
                "imported {} turns ({} malformed, {} over capacity, {} expired)",
                report.imported,
                report.skipped_malformed,
                report.dropped_over_capacity,
                report.dropped_expired
            );
        }
        ShellCommand::Reset(category) => {
            gh.limiter().reset(&state.actor, category);
            println!("{}", "limits reset".dimmed());
        }
        ShellCommand::Scope(name) => {
            state.scope = name.map(ScopeId::named).unwrap_or(ScopeId::Unscoped);
        }
        ShellCommand::Actor(id) => {
            state.actor = ActorId::from(id);
        }
        ShellCommand::Help => print_help(),
        ShellCommand::Invalid(message) => eprintln!("{}", message.yellow()),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn format_limit(label: &str, limit: &LimitReport) -> String {
    let mut line = format!(
        "{label:<8} {}/{} in {}s",
        limit.used,
        limit.capacity,
        limit.window.as_secs()
    );
    if !limit.time_until_reset.is_zero() {
        line.push_str(&format!(", resets in {}s", limit.time_until_reset.as_secs()));
    }
    line
}

fn print_help() {
    println!(
        "\
<text>              send as a chat request
/chat|/ask|/moderate <text>
                    send in a specific category
/stats              limiter usage and memory for the current actor
/memory             store-wide totals
/clear [all]        forget the current scope, or every scope
/export             print the current scope as JSON
/import <file>      replace the current scope from a JSON file
/reset [category]   clear limiter history
/scope [name]       switch scope; no name means unscoped
/actor <id>         switch actor
/quit               exit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_chat_request() {
        assert_eq!(
            parse_command("hello there"),
            ShellCommand::Say {
                category: Category::Chat,
                text: "hello there"
            }
        );
    }

    #[test]
    fn category_commands_carry_their_text() {
        assert_eq!(
            parse_command("/ask  what is rust?"),
            ShellCommand::Say {
                category: Category::Ask,
                text: "what is rust?"
            }
        );
        assert!(matches!(parse_command("/moderate"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn arguments_are_parsed() {
        assert_eq!(parse_command("/clear all"), ShellCommand::Clear { all_scopes: true });
        assert_eq!(parse_command("/clear"), ShellCommand::Clear { all_scopes: false });
        assert_eq!(parse_command("/reset ask"), ShellCommand::Reset(Some(Category::Ask)));
        assert_eq!(parse_command("/reset"), ShellCommand::Reset(None));
        assert_eq!(parse_command("/scope"), ShellCommand::Scope(None));
        assert_eq!(parse_command("/scope dm"), ShellCommand::Scope(Some("dm")));
        assert!(matches!(parse_command("/reset global"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command("/nope"), ShellCommand::Invalid(_)));
        assert_eq!(parse_command("/exit"), ShellCommand::Quit);
    }

    #[test]
    fn limit_line_shows_reset_only_when_pending() {
        let mut limit = LimitReport {
            used: 1,
            capacity: 5,
            window: std::time::Duration::from_secs(60),
            time_until_reset: std::time::Duration::ZERO,
        };
        assert_eq!(format_limit("ask", &limit), "ask      1/5 in 60s");
        limit.time_until_reset = std::time::Duration::from_secs(12);
        assert!(format_limit("ask", &limit).ends_with("resets in 12s"));
    }

    #[tokio::test]
    async fn echo_generator_reports_context_size() {
        let prior = vec![ContextMessage {
            role: gatehouse_core::Role::User,
            content: "x".into(),
        }];
        let reply = EchoGenerator.generate("hi", &prior).await.unwrap();
        assert_eq!(reply, "echo (1 prior turns): hi");
    }
}
