// CLI module
// Transcript, conversation shell, terminal view, REPL and `watch`

mod commands;
mod conversation;
mod repl;
mod shell;
mod view;
mod watch;

pub use commands::{handle_command, Command};
pub use conversation::{Role, Transcript, Turn};
pub use repl::{run_once, Repl};
pub use shell::{ConversationShell, TurnOutcome};
pub use view::{
    render_markdown, unstreamed_suffix, TerminalView, TranscriptView, INTERRUPTED_MARKER,
};
pub use watch::{run_watch, status_line};
