// Presentation boundary between the shell and the terminal

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use super::conversation::{Role, Turn};

/// What the shell needs from a display.
pub trait TranscriptView {
    /// A complete turn that was not streamed.
    fn show_turn(&mut self, turn: &Turn);

    /// Next fragment of a reply being streamed.
    fn stream_fragment(&mut self, fragment: &str);

    /// The streamed reply has been finalized as `turn`.
    fn stream_finished(&mut self, turn: &Turn);

    /// Out-of-band notice (disabled features, hints).
    fn show_notice(&mut self, notice: &str);

    /// A slow collaborator call started.
    fn begin_activity(&mut self, _label: &str) {}

    fn end_activity(&mut self) {}
}

/// Terminal output with a spinner for slow calls.
pub struct TerminalView {
    interactive: bool,
    spinner: Option<ProgressBar>,
    /// Text of the reply currently being streamed.
    streamed: String,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
            spinner: None,
            streamed: String::new(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn print_assistant(&self, content: &str) {
        if self.interactive {
            println!("{}", render_markdown(content));
        } else {
            println!("{}", content);
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptView for TerminalView {
    fn show_turn(&mut self, turn: &Turn) {
        match turn.role {
            // The prompt is already on screen in interactive mode
            Role::User if self.interactive => {}
            Role::User => println!("> {}", turn.content),
            Role::Assistant => {
                println!();
                self.print_assistant(&turn.content);
            }
        }
    }

    fn stream_fragment(&mut self, fragment: &str) {
        if self.streamed.is_empty() {
            println!();
        }
        self.streamed.push_str(fragment);
        print!("{}", fragment);
        let _ = io::stdout().flush();
    }

    fn stream_finished(&mut self, turn: &Turn) {
        if self.streamed.is_empty() {
            self.show_turn(turn);
            return;
        }

        // Only what the shell added after the stream (marker, error) is new
        let rest = unstreamed_suffix(&self.streamed, &turn.content);
        if !rest.is_empty() {
            if !self.interactive {
                print!("{}", rest);
            } else if rest.trim_start() == INTERRUPTED_MARKER.trim_start() {
                print!("{}", rest.dark_grey());
            } else {
                print!("{}", render_markdown(rest));
            }
        }
        println!();
        self.streamed.clear();
    }

    fn show_notice(&mut self, notice: &str) {
        if self.interactive {
            println!("{}", notice.yellow());
        } else {
            eprintln!("# {}", notice);
        }
    }

    fn begin_activity(&mut self, label: &str) {
        if !self.interactive {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("{}...", label));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn end_activity(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Marker appended to a reply cut short by Ctrl-C.
pub const INTERRUPTED_MARKER: &str = "\n\n_[interrupted]_";

/// Part of a finalized reply not yet shown while streaming.
///
/// The shell may trim the streamed text before appending a marker or an
/// error, so a trimmed prefix also counts. When the streamed text is not a
/// prefix at all, the whole content is returned.
pub fn unstreamed_suffix<'a>(streamed: &str, content: &'a str) -> &'a str {
    if let Some(rest) = content.strip_prefix(streamed) {
        return rest;
    }
    content
        .trim_start()
        .strip_prefix(streamed.trim())
        .unwrap_or(content)
}

/// Minimal terminal rendering: `**bold**` spans become bold text.
pub fn render_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, piece) in text.split("**").enumerate() {
        if i % 2 == 1 {
            out.push_str(&piece.bold().to_string());
        } else {
            out.push_str(piece);
        }
    }
    out
}
