//! Parses shell lines into commands and runs them against a `Session`.

use colored::Colorize;
use std::time::Duration;
use tomato::common::format_duration;
use tomato::prelude::*;

/// Which configured duration a `/config` edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Work,
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Start { work_minutes: i64, break_minutes: i64 },
    Pause,
    Resume,
    Next,
    Cancel,
    Status,
    Stats,
    ClearStats,
    ShowConfig,
    SetConfig { key: ConfigKey, minutes: i64 },
    Help,
    Exit,
    /// A `/word` that is not a known command, or a malformed `/config` edit.
    Unknown(String),
    /// Input that does not start with `/`.
    NotACommand,
    Empty,
}

/// What the shell loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Parses one input line. Non-numeric minute arguments count as 0.
pub fn parse(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    if !line.starts_with('/') {
        return ShellCommand::NotACommand;
    }

    let args = line.split_whitespace().collect::<Vec<_>>();
    let number = |index: usize| {
        args.get(index)
            .and_then(|arg| arg.parse::<i64>().ok())
            .unwrap_or(0)
    };

    match args[0] {
        "/start" => ShellCommand::Start {
            work_minutes: number(1),
            break_minutes: number(2),
        },
        "/pause" => ShellCommand::Pause,
        "/resume" => ShellCommand::Resume,
        "/next" => ShellCommand::Next,
        "/cancel" | "/stop" => ShellCommand::Cancel,
        "/status" => ShellCommand::Status,
        "/stats" => match args.get(1) {
            Some(&"clear") => ShellCommand::ClearStats,
            _ => ShellCommand::Stats,
        },
        "/config" => match args.get(1) {
            None => ShellCommand::ShowConfig,
            Some(&"work") => ShellCommand::SetConfig {
                key: ConfigKey::Work,
                minutes: number(2),
            },
            Some(&"break") => ShellCommand::SetConfig {
                key: ConfigKey::Break,
                minutes: number(2),
            },
            Some(_) => ShellCommand::Unknown(line.to_string()),
        },
        "/help" => ShellCommand::Help,
        "/exit" | "/quit" => ShellCommand::Exit,
        other => ShellCommand::Unknown(other.to_string()),
    }
}

fn print_error(e: impl std::fmt::Display) {
    println!("{} {}", "Error:".red().bold(), e);
}

fn print_help() {
    println!("Available commands:");
    println!("  /start [work] [break]  - Start pomodoro (e.g., /start 25 5)");
    println!("  /pause                 - Pause current timer");
    println!("  /resume                - Resume paused timer");
    println!("  /next                  - Skip to next phase");
    println!("  /cancel /stop          - Cancel current session");
    println!("  /status                - Show current status");
    println!("  /stats                 - Show statistics");
    println!("  /stats clear           - Delete all recorded sessions");
    println!("  /config                - Show configuration");
    println!("  /config work <M>       - Set the default work length in minutes");
    println!("  /config break <M>      - Set the default break length in minutes");
    println!("  /help                  - Show this help");
    println!("  /exit /quit            - Exit");
}

/// Runs one parsed command, printing its outcome.
pub async fn execute(session: &Session, command: ShellCommand) -> Flow {
    match command {
        ShellCommand::Start {
            work_minutes,
            break_minutes,
        } => match session.start(work_minutes, break_minutes).await {
            Ok(StartOutcome::Started(plan)) => println!(
                "Started: {} work, {} break",
                format_duration(plan.work_duration),
                format_duration(plan.break_duration)
            ),
            Ok(StartOutcome::AlreadyRunning) => {
                println!("Already running: {}", session.status().await)
            }
            Err(e) => print_error(e),
        },
        ShellCommand::Pause => match session.pause().await {
            Ok(()) => println!("Timer paused"),
            Err(e) => print_error(e),
        },
        ShellCommand::Resume => match session.resume().await {
            Ok(()) => println!("Timer resumed"),
            Err(e) => print_error(e),
        },
        ShellCommand::Next => match session.next().await {
            Ok(()) => println!("Skipped to next phase"),
            Err(e) => print_error(e),
        },
        ShellCommand::Cancel => match session.cancel().await {
            Ok(()) => println!("Session cancelled"),
            Err(e) => print_error(e),
        },
        ShellCommand::Status => println!("Status: {}", session.status().await.as_str().cyan()),
        ShellCommand::Stats => {
            println!("Statistics:");
            println!("  Total completed: {}", session.total_completed());
            println!("  Today completed: {}", session.today_completed());
        }
        ShellCommand::ClearStats => match session.clear_stats() {
            Ok(()) => println!("Statistics cleared"),
            Err(e) => print_error(e),
        },
        ShellCommand::ShowConfig => {
            let config = session.config();
            println!("Configuration:");
            println!("  Work duration: {}", format_duration(config.work_duration));
            println!("  Break duration: {}", format_duration(config.break_duration));
        }
        ShellCommand::SetConfig { key, minutes } => {
            let Some(duration) = tomato::common::minutes(minutes) else {
                println!("Usage: /config work|break <MINUTES>  (minutes must be positive)");
                return Flow::Continue;
            };
            let result = match key {
                ConfigKey::Work => session.set_work_duration(duration),
                ConfigKey::Break => session.set_break_duration(duration),
            };
            match result {
                Ok(()) => println!("Saved: {}", describe_edit(key, duration)),
                Err(e) => print_error(e),
            }
        }
        ShellCommand::Help => print_help(),
        ShellCommand::Exit => {
            println!("Goodbye!");
            return Flow::Exit;
        }
        ShellCommand::Unknown(command) => {
            println!("Unknown command: {}. Type /help for available commands", command)
        }
        ShellCommand::NotACommand => {
            println!("Unknown command. Type /help for available commands")
        }
        ShellCommand::Empty => {}
    }
    Flow::Continue
}

fn describe_edit(key: ConfigKey, duration: Duration) -> String {
    let name = match key {
        ConfigKey::Work => "work",
        ConfigKey::Break => "break",
    };
    format!("{} duration is now {}", name, format_duration(duration))
}
