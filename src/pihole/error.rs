// Pi-hole client errors

use thiserror::Error;

/// Longest response body quoted back in an error.
const MAX_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AdBlockerError {
    /// Connection, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    /// Pi-hole answers unauthenticated calls with an empty JSON array.
    #[error("request rejected by Pi-hole (check the API token)")]
    Unauthorized,
}

impl AdBlockerError {
    pub fn status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = if body.chars().count() > MAX_BODY_CHARS {
            let cut: String = body.chars().take(MAX_BODY_CHARS).collect();
            format!("{}…", cut)
        } else {
            body.to_string()
        };
        AdBlockerError::Status { status, body }
    }
}

impl From<reqwest::Error> for AdBlockerError {
    fn from(e: reqwest::Error) -> Self {
        // The URL carries the auth token; keep it out of messages
        AdBlockerError::Transport(e.without_url())
    }
}

impl From<serde_json::Error> for AdBlockerError {
    fn from(e: serde_json::Error) -> Self {
        AdBlockerError::Decode(e.to_string())
    }
}
