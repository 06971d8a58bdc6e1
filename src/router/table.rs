// Default keyword table
//
// Order is precedence: the first phrase found in the text wins. Pi-hole
// phrases come before the generic "status" phrases so that "pi-hole status"
// never resolves to the Raspberry Pi report.

use super::decision::ActionTag;

pub const DEFAULT_KEYWORDS: &[(&str, ActionTag)] = &[
    ("pi-hole status", ActionTag::PiholeStatus),
    ("pihole status", ActionTag::PiholeStatus),
    ("enable pi-hole", ActionTag::PiholeEnable),
    ("enable pihole", ActionTag::PiholeEnable),
    ("disable pi-hole", ActionTag::PiholeDisable),
    ("disable pihole", ActionTag::PiholeDisable),
    ("pi-hole summary", ActionTag::PiholeSummary),
    ("pihole summary", ActionTag::PiholeSummary),
    ("top blocked domains", ActionTag::TopBlockedDomains),
    ("most blocked domains", ActionTag::TopBlockedDomains),
    ("blacklist domain add", ActionTag::BlacklistAdd),
    ("blacklist domain remove", ActionTag::BlacklistRemove),
    ("blacklist domain delete", ActionTag::BlacklistRemove),
    ("raspberry pi status", ActionTag::PiStatus),
    ("pi status", ActionTag::PiStatus),
    ("system status", ActionTag::PiStatus),
    ("network status", ActionTag::NetworkStatus),
    ("internet status", ActionTag::NetworkStatus),
];

/// Owned copy of [`DEFAULT_KEYWORDS`].
pub fn default_keywords() -> Vec<(String, ActionTag)> {
    DEFAULT_KEYWORDS
        .iter()
        .map(|(phrase, tag)| (phrase.to_string(), *tag))
        .collect()
}
