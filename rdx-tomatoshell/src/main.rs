mod repl;
mod settings;

use anyhow::{Context, Result};
use colored::Colorize;
use repl::Flow;
use rustyline::highlight::Highlighter;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use settings::ShellSettings;
use std::borrow::Cow;
use tomato::common::format_duration;
use tomato::prelude::*;
use tomato::{ENGINE_NAME, VERSION as LIB_VERSION};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that highlights the command word.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.red().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.red().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner(settings: &ShellSettings) {
    if settings.quiet {
        return;
    }
    // Embedded at compile time from the crate root.
    const LOGO_TEXT: &str = include_str!("../logo.log");
    println!("{}", LOGO_TEXT.red());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!("{}", "-----------------------------------------------------------------".dimmed());
    println!("{}", version_string);
    println!("{}", "-----------------------------------------------------------------".dimmed());
}

/// Prints a notice whenever a phase finishes on its own.
fn spawn_completion_listener(session: &Session) {
    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let TimerEvent::PhaseCompleted {
                phase,
                total_duration,
            } = event
            {
                let notice = match phase {
                    Phase::Work => "Work phase complete! Time for a break.",
                    _ => "Break is over. Back to work!",
                };
                println!(
                    "\n<-- {} ({})\n>> ",
                    notice.green().bold(),
                    format_duration(total_duration)
                );
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = ShellSettings::load().context("Error loading shell settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    print_banner(&settings);

    let dir = settings.data_dir()?;
    let config = ConfigStore::open(&dir, TimerConfig::DEFAULT).context("Error loading config")?;
    let history = HistoryStore::open(&dir).context("Error loading stats")?;
    info!(
        "Using config {} and stats {}",
        config.path().display(),
        history.path().display()
    );

    let session = Session::new(config, history);
    if settings.notify {
        spawn_completion_listener(&session);
    }

    let mut rl: Editor<CommandHighlighter, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!("{} - Pomodoro Timer", ENGINE_NAME.red().bold());
    println!("Type /help for available commands");
    println!();

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                if repl::execute(&session, repl::parse(&line)).await == Flow::Exit {
                    break;
                }
            }
            Err(_) => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}
