// Pi-hole API response types
//
// Pi-hole reports counters either as JSON numbers or, without `summaryRaw`,
// as formatted strings such as "12,345". Both are accepted.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Blocking state as reported by the appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdBlockerStatus {
    Enabled,
    Disabled,
    Error(String),
}

impl AdBlockerStatus {
    pub fn from_status_field(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "enabled" => AdBlockerStatus::Enabled,
            "disabled" => AdBlockerStatus::Disabled,
            other => AdBlockerStatus::Error(format!("unexpected status '{}'", other)),
        }
    }
}

/// `?summary` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdBlockerSummary {
    #[serde(rename = "dns_queries_today", deserialize_with = "count")]
    pub queries_today: u64,

    #[serde(rename = "ads_blocked_today", deserialize_with = "count")]
    pub blocked_today: u64,

    #[serde(rename = "ads_percentage_today", deserialize_with = "percentage")]
    pub blocked_percentage: f64,

    #[serde(rename = "domains_being_blocked", deserialize_with = "count")]
    pub domains_on_blocklist: u64,

    #[serde(default, deserialize_with = "optional_count")]
    pub unique_clients: Option<u64>,

    #[serde(default, deserialize_with = "optional_count")]
    pub clients_ever_seen: Option<u64>,

    #[serde(default, deserialize_with = "optional_count")]
    pub queries_cached: Option<u64>,

    #[serde(default, deserialize_with = "optional_count")]
    pub queries_forwarded: Option<u64>,
}

/// `?topDomainsBlocked` response, ranked by the appliance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopBlocked {
    #[serde(rename = "top_domains_blocked", default)]
    pub domains: OrderedCounts,
}

/// Domain → count pairs in the order they appeared in the JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedCounts(pub Vec<(String, u64)>);

impl OrderedCounts {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, u64)> {
        self.0.iter()
    }
}

/// Outcome of a blacklist add/remove call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistOutcome {
    Added,
    Removed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistResult {
    pub domain: String,
    pub outcome: BlacklistOutcome,
}

impl BlacklistResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, BlacklistOutcome::Failed(_))
    }
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative count as a number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative count {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        if v.is_finite() && v >= 0.0 {
            Ok(v.round() as u64)
        } else {
            Err(E::custom(format!("invalid count {}", v)))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        let cleaned: String = v.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
        cleaned
            .parse::<u64>()
            .map_err(|_| E::custom(format!("invalid count '{}'", v)))
    }
}

struct PercentageVisitor;

impl<'de> Visitor<'de> for PercentageVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a percentage as a number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        v.trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| E::custom(format!("invalid percentage '{}'", v)))
    }
}

fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    d.deserialize_any(CountVisitor)
}

fn percentage<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    d.deserialize_any(PercentageVisitor)
}

fn optional_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    count(d).map(Some)
}

struct Count(u64);

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        count(d).map(Count)
    }
}

struct OrderedCountsVisitor;

impl<'de> Visitor<'de> for OrderedCountsVisitor {
    type Value = OrderedCounts;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping domains to counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OrderedCounts, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((domain, Count(n))) = map.next_entry::<String, Count>()? {
            entries.push((domain, n));
        }
        Ok(OrderedCounts(entries))
    }

    // PHP encodes an empty associative array as `[]`
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<OrderedCounts, A::Error> {
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::custom("expected an empty list"));
        }
        Ok(OrderedCounts::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<OrderedCounts, E> {
        Ok(OrderedCounts::default())
    }
}

impl<'de> Deserialize<'de> for OrderedCounts {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(OrderedCountsVisitor)
    }
}
