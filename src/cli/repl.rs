// Interactive REPL

use anyhow::{Context, Result};
use crossterm::{style::Stylize, terminal};
use std::ops::ControlFlow;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::commands::{handle_command, Command};
use super::shell::ConversationShell;
use super::view::{TerminalView, TranscriptView};

/// Shown on Ctrl-C while a check is running; only streamed replies stop.
const BUSY_HINT: &str = "(A check is running and cannot be interrupted; waiting for it to finish)";

/// Get current terminal width, or default to 80 if not a TTY
fn terminal_width() -> usize {
    terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
}

pub struct Repl {
    shell: ConversationShell,
    view: TerminalView,
}

impl Repl {
    pub fn new(shell: ConversationShell) -> Self {
        Self {
            shell,
            view: TerminalView::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("Failed to initialise line editor")?;
        self.print_banner();

        loop {
            if self.view.is_interactive() {
                println!();
                self.print_separator();
            }

            let line = match editor.readline("> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "(Type /quit or press Ctrl-D to exit)".dark_grey());
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e).context("Failed to read input"),
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            let _ = editor.add_history_entry(input);

            if let Some(command) = Command::parse(input) {
                let output = handle_command(command, self.shell.transcript());
                println!("{}", output);
                if command == Command::Quit {
                    break;
                }
                continue;
            }

            run_turn(&mut self.shell, &mut self.view, input).await;
        }

        Ok(())
    }

    fn print_banner(&mut self) {
        if self.view.is_interactive() {
            println!(
                "{} v{} - Raspberry Pi and Pi-hole monitor",
                "pi-eye".bold(),
                env!("CARGO_PKG_VERSION")
            );
            println!("Replies from: {}", self.shell.generator_name());
            println!("Type /help for commands.");
        } else {
            eprintln!("# pi-eye v{} - non-interactive mode", env!("CARGO_PKG_VERSION"));
        }

        if let Some(notice) = self.shell.pihole_notice() {
            self.view.show_notice(&notice);
        }
    }

    /// Print separator line that adapts to terminal width
    fn print_separator(&self) {
        println!("{}", "─".repeat(terminal_width()).dark_grey());
    }
}

/// Answer a single prompt and return (for `pi-eye ask`).
pub async fn run_once(shell: &mut ConversationShell, prompt: &str) {
    let mut view = TerminalView::new();
    if let Some(notice) = shell.pihole_notice() {
        view.show_notice(&notice);
    }
    run_turn(shell, &mut view, prompt).await;
}

async fn run_turn(shell: &mut ConversationShell, view: &mut dyn TranscriptView, input: &str) {
    let cancel = CancellationToken::new();
    let watcher = spawn_interrupt_watcher(cancel.clone());
    let reply = shell.reply(input, view, &cancel).await;
    watcher.abort();

    let outcome = match reply {
        ControlFlow::Continue(routed_text) => {
            let hint = spawn_busy_hint();
            let outcome = shell.act(input, &routed_text, view).await;
            hint.abort();
            outcome
        }
        ControlFlow::Break(outcome) => outcome,
    };
    tracing::debug!("Turn finished: {:?}", outcome);
}

/// Cancel `token` on the next Ctrl-C. Abort the handle once streaming is over.
fn spawn_interrupt_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

/// Answer every Ctrl-C with [`BUSY_HINT`] until aborted.
fn spawn_busy_hint() -> JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", BUSY_HINT.dark_grey());
        }
    })
}
