// Slash command handling

use super::conversation::Transcript;

/// Longest line shown per turn in `/history`.
const HISTORY_PREVIEW_CHARS: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    History,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" | "/?" => Some(Command::Help),
            "/history" => Some(Command::History),
            "/quit" | "/exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub fn handle_command(command: Command, transcript: &Transcript) -> String {
    match command {
        Command::Help => format_help(),
        Command::History => format_history(transcript),
        Command::Quit => "Goodbye!".to_string(),
    }
}

fn format_help() -> String {
    r#"Available commands:
  /help      - Show this help message
  /history   - List this session's turns
  /quit      - Exit (Ctrl-D also works)

Ask about your Pi, for example:
  pi status, network status, pi-hole status, pi-hole summary,
  enable pi-hole, disable pi-hole, top blocked domains,
  blacklist domain add example.com, blacklist domain remove example.com

Ctrl-C stops a reply that is still streaming."#
        .to_string()
}

fn format_history(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return "No turns yet.".to_string();
    }

    let mut output = format!("Session history ({} turns):\n", transcript.len());
    for (i, turn) in transcript.turns().iter().enumerate() {
        let first_line = turn.content.lines().next().unwrap_or_default();
        let preview: String = first_line.chars().take(HISTORY_PREVIEW_CHARS).collect();
        let ellipsis = if preview.len() < turn.content.trim_end().len() {
            "…"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {:>3}. [{}] {:<9} {}{}\n",
            i + 1,
            turn.timestamp.format("%H:%M:%S"),
            turn.role,
            preview,
            ellipsis
        ));
    }
    output
}
