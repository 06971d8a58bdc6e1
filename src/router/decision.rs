// Routing decision logic

use std::fmt;
use std::str::FromStr;

use super::table::default_keywords;

/// The fixed set of actions free text can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    PiStatus,
    NetworkStatus,
    PiholeStatus,
    PiholeEnable,
    PiholeDisable,
    PiholeSummary,
    TopBlockedDomains,
    BlacklistAdd,
    BlacklistRemove,
    Unknown,
}

impl ActionTag {
    pub const ALL: [ActionTag; 10] = [
        ActionTag::PiStatus,
        ActionTag::NetworkStatus,
        ActionTag::PiholeStatus,
        ActionTag::PiholeEnable,
        ActionTag::PiholeDisable,
        ActionTag::PiholeSummary,
        ActionTag::TopBlockedDomains,
        ActionTag::BlacklistAdd,
        ActionTag::BlacklistRemove,
        ActionTag::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::PiStatus => "pi_status",
            ActionTag::NetworkStatus => "network_status",
            ActionTag::PiholeStatus => "pihole_status",
            ActionTag::PiholeEnable => "pihole_enable",
            ActionTag::PiholeDisable => "pihole_disable",
            ActionTag::PiholeSummary => "pihole_summary",
            ActionTag::TopBlockedDomains => "top_blocked_domains",
            ActionTag::BlacklistAdd => "blacklist_add",
            ActionTag::BlacklistRemove => "blacklist_remove",
            ActionTag::Unknown => "unknown",
        }
    }

    /// Actions served by the Pi-hole client.
    pub fn needs_pihole(&self) -> bool {
        matches!(
            self,
            ActionTag::PiholeStatus
                | ActionTag::PiholeEnable
                | ActionTag::PiholeDisable
                | ActionTag::PiholeSummary
                | ActionTag::TopBlockedDomains
                | ActionTag::BlacklistAdd
                | ActionTag::BlacklistRemove
        )
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s.trim())
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

/// A routed action, with the blacklist domain already pulled out of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    PiStatus,
    NetworkStatus,
    PiholeStatus,
    PiholeEnable,
    PiholeDisable,
    PiholeSummary,
    TopBlockedDomains,
    BlacklistAdd { domain: String },
    BlacklistRemove { domain: String },
    /// A blacklist action was recognised but the prompt carried no domain.
    MissingDomain(ActionTag),
    Unknown,
}

impl RouteDecision {
    pub fn tag(&self) -> ActionTag {
        match self {
            RouteDecision::PiStatus => ActionTag::PiStatus,
            RouteDecision::NetworkStatus => ActionTag::NetworkStatus,
            RouteDecision::PiholeStatus => ActionTag::PiholeStatus,
            RouteDecision::PiholeEnable => ActionTag::PiholeEnable,
            RouteDecision::PiholeDisable => ActionTag::PiholeDisable,
            RouteDecision::PiholeSummary => ActionTag::PiholeSummary,
            RouteDecision::TopBlockedDomains => ActionTag::TopBlockedDomains,
            RouteDecision::BlacklistAdd { .. } => ActionTag::BlacklistAdd,
            RouteDecision::BlacklistRemove { .. } => ActionTag::BlacklistRemove,
            RouteDecision::MissingDomain(tag) => *tag,
            RouteDecision::Unknown => ActionTag::Unknown,
        }
    }
}

/// First-match-wins keyword router.
pub struct Router {
    keywords: Vec<(String, ActionTag)>,
}

impl Router {
    /// Build a router over an ordered `(phrase, tag)` list. Phrases are
    /// compared in lowercase.
    pub fn new(keywords: Vec<(String, ActionTag)>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|(phrase, tag)| (phrase.to_lowercase(), tag))
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[(String, ActionTag)] {
        &self.keywords
    }

    /// Classify text into a tag. Pure; `Unknown` when no phrase matches.
    pub fn classify(&self, text: &str) -> ActionTag {
        self.matching_phrase(text)
            .map(|(_, tag)| tag)
            .unwrap_or(ActionTag::Unknown)
    }

    /// Route `routed_text` (model reply, or the prompt itself in demo mode)
    /// and extract blacklist domains from `prompt`.
    pub fn route(&self, routed_text: &str, prompt: &str) -> RouteDecision {
        let Some((phrase, tag)) = self.matching_phrase(routed_text) else {
            tracing::info!("Routing decision: UNKNOWN (no keyword matched)");
            return RouteDecision::Unknown;
        };

        tracing::info!("Routing decision: {} (matched '{}')", tag, phrase);

        match tag {
            ActionTag::PiStatus => RouteDecision::PiStatus,
            ActionTag::NetworkStatus => RouteDecision::NetworkStatus,
            ActionTag::PiholeStatus => RouteDecision::PiholeStatus,
            ActionTag::PiholeEnable => RouteDecision::PiholeEnable,
            ActionTag::PiholeDisable => RouteDecision::PiholeDisable,
            ActionTag::PiholeSummary => RouteDecision::PiholeSummary,
            ActionTag::TopBlockedDomains => RouteDecision::TopBlockedDomains,
            ActionTag::BlacklistAdd => match extract_domain(prompt, phrase) {
                Some(domain) => RouteDecision::BlacklistAdd { domain },
                None => RouteDecision::MissingDomain(tag),
            },
            ActionTag::BlacklistRemove => match extract_domain(prompt, phrase) {
                Some(domain) => RouteDecision::BlacklistRemove { domain },
                None => RouteDecision::MissingDomain(tag),
            },
            ActionTag::Unknown => RouteDecision::Unknown,
        }
    }

    fn matching_phrase(&self, text: &str) -> Option<(&str, ActionTag)> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .find(|(phrase, _)| text.contains(phrase.as_str()))
            .map(|(phrase, tag)| (phrase.as_str(), *tag))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(default_keywords())
    }
}

/// Text following the last occurrence of `phrase` in `prompt`, trimmed.
///
/// Matching is ASCII case-insensitive so byte offsets stay valid. Returns
/// `None` when the phrase is absent or nothing follows it.
pub fn extract_domain(prompt: &str, phrase: &str) -> Option<String> {
    let haystack = prompt.to_ascii_lowercase();
    let needle = phrase.to_ascii_lowercase();

    let start = haystack.rfind(&needle)? + needle.len();
    let domain = prompt[start..].trim();

    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}
