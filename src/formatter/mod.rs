// Response formatting - structured results to markdown
//
// Pure functions. Every field is rendered in a fixed order; error-shaped
// inputs produce a message without any of the normal fields.

use crate::monitoring::MetricsSnapshot;
use crate::network::NetworkSnapshot;
use crate::pihole::{
    AdBlockerError, AdBlockerStatus, AdBlockerSummary, BlacklistOutcome, BlacklistResult,
    TopBlocked,
};
use crate::router::ActionTag;

/// Enable or disable, for [`format_toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Enable,
    Disable,
}

impl Toggle {
    pub fn verb(&self) -> &'static str {
        match self {
            Toggle::Enable => "enable",
            Toggle::Disable => "disable",
        }
    }
}

pub fn format_metrics(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::from("**Raspberry Pi System Status**\n\n");
    out.push_str(&format!("- **CPU Usage:** {}\n", snapshot.cpu_usage));
    out.push_str(&format!("- **RAM Usage:** {}\n", snapshot.ram_usage));
    out.push_str(&format!("- **Disk Usage:** {}\n", snapshot.disk_usage));
    out.push_str(&format!(
        "- **CPU Temperature:** {}\n",
        snapshot.cpu_temperature
    ));
    out
}

pub fn format_network(snapshot: &NetworkSnapshot) -> String {
    let mut out = String::from("**Network Status**\n\n");
    out.push_str(&format!("- **Download Speed:** {}\n", snapshot.download));
    out.push_str(&format!("- **Upload Speed:** {}\n", snapshot.upload));
    out.push_str(&format!("- **Ping:** {}\n", snapshot.ping));
    out.push_str("- **Internal IPs:**");
    if snapshot.interfaces.is_empty() {
        out.push_str(" N/A\n");
    } else {
        out.push('\n');
        for iface in &snapshot.interfaces {
            out.push_str(&format!("  - {}: {}\n", iface.name, iface.ipv4));
        }
    }
    out.push_str(&format!("- **External IP:** {}\n", snapshot.external_ip));
    out
}

pub fn format_status(status: &AdBlockerStatus) -> String {
    match status {
        AdBlockerStatus::Enabled => "**Pi-hole Status:** ENABLED".to_string(),
        AdBlockerStatus::Disabled => "**Pi-hole Status:** DISABLED".to_string(),
        AdBlockerStatus::Error(detail) => format!(
            "**Pi-hole Status:** Error communicating with Pi-hole API. \
             Check API URL and token.\nDetails: {}",
            detail
        ),
    }
}

pub fn format_toggle(action: Toggle, result: &Result<(), AdBlockerError>) -> String {
    match result {
        Ok(()) => format!("Pi-hole {}d.", action.verb()),
        Err(e) => format!("Failed to {} Pi-hole: {}", action.verb(), e),
    }
}

pub fn format_summary(result: &Result<AdBlockerSummary, AdBlockerError>) -> String {
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => return format!("Error fetching Pi-hole summary: {}", e),
    };

    let mut out = String::from("**Pi-hole Summary**\n\n");
    out.push_str(&format!(
        "- **Total Queries:** {}\n",
        group_thousands(summary.queries_today)
    ));
    out.push_str(&format!(
        "- **Queries Blocked:** {} ({:.1}%)\n",
        group_thousands(summary.blocked_today),
        summary.blocked_percentage
    ));
    out.push_str(&format!(
        "- **Domains on Adlists:** {}\n",
        group_thousands(summary.domains_on_blocklist)
    ));

    let optional = [
        ("Unique Clients", summary.unique_clients),
        ("Clients Ever Seen", summary.clients_ever_seen),
        ("Queries Cached", summary.queries_cached),
        ("Queries Forwarded", summary.queries_forwarded),
    ];
    for (label, value) in optional {
        if let Some(n) = value {
            out.push_str(&format!("- **{}:** {}\n", label, group_thousands(n)));
        }
    }
    out
}

pub fn format_top_blocked(result: &Result<TopBlocked, AdBlockerError>) -> String {
    let top = match result {
        Ok(top) => top,
        Err(e) => return format!("Error fetching top blocked domains: {}", e),
    };

    if top.domains.is_empty() {
        return "No top blocked domains data available.".to_string();
    }

    let mut out = String::from("**Top Blocked Domains**\n\n");
    for (domain, count) in top.domains.iter() {
        out.push_str(&format!("- {}: {} blocks\n", domain, group_thousands(*count)));
    }
    out
}

pub fn format_blacklist(result: &BlacklistResult) -> String {
    match &result.outcome {
        BlacklistOutcome::Added => format!("Domain '{}' added to blacklist.", result.domain),
        BlacklistOutcome::Removed => {
            format!("Domain '{}' removed from blacklist.", result.domain)
        }
        BlacklistOutcome::Failed(reason) => {
            format!("Failed to update blacklist for '{}': {}", result.domain, reason)
        }
    }
}

/// Guidance for a blacklist request that named no domain.
pub fn format_missing_domain(tag: ActionTag) -> String {
    match tag {
        ActionTag::BlacklistRemove => "Please specify a domain to remove from the blacklist \
             (e.g., 'blacklist domain remove example.com')."
            .to_string(),
        _ => "Please specify a domain to blacklist \
              (e.g., 'blacklist domain add example.com')."
            .to_string(),
    }
}

/// Notice shown when a feature cannot run because of configuration.
pub fn format_disabled_feature(feature: &str, reason: &str) -> String {
    format!(
        "{} is unavailable: {}. Set it in the config file or environment and restart.",
        feature, reason
    )
}

/// `1234567` → `1,234,567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
