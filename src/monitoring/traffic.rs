// Network traffic watch
//
// Samples cumulative interface counters and flags suspicious deltas between
// consecutive samples.

use std::fmt;
use sysinfo::Networks;

use crate::config::MonitoringConfig;

/// Cumulative counters summed over every interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficSample {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

impl TrafficSample {
    /// Read the current totals from the OS.
    pub fn capture() -> Self {
        let networks = Networks::new_with_refreshed_list();
        networks
            .iter()
            .fold(TrafficSample::default(), |acc, (_, data)| TrafficSample {
                bytes_sent: acc.bytes_sent + data.total_transmitted(),
                bytes_received: acc.bytes_received + data.total_received(),
                packets_sent: acc.packets_sent + data.total_packets_transmitted(),
                packets_received: acc.packets_received + data.total_packets_received(),
                errors_in: acc.errors_in + data.total_errors_on_received(),
                errors_out: acc.errors_out + data.total_errors_on_transmitted(),
            })
    }

    /// Per-counter growth since `earlier`, clamped at zero.
    pub fn delta_since(&self, earlier: &TrafficSample) -> TrafficSample {
        TrafficSample {
            bytes_sent: self.bytes_sent.saturating_sub(earlier.bytes_sent),
            bytes_received: self.bytes_received.saturating_sub(earlier.bytes_received),
            packets_sent: self.packets_sent.saturating_sub(earlier.packets_sent),
            packets_received: self.packets_received.saturating_sub(earlier.packets_received),
            errors_in: self.errors_in.saturating_sub(earlier.errors_in),
            errors_out: self.errors_out.saturating_sub(earlier.errors_out),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrafficAnomaly {
    /// A byte counter decreased.
    ByteCounterReset,
    /// A packet counter decreased.
    PacketCounterReset,
    ElevatedErrors { errors_in: u64, errors_out: u64 },
    HighVolume { bytes_sent: u64, bytes_received: u64 },
}

impl fmt::Display for TrafficAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficAnomaly::ByteCounterReset => write!(
                f,
                "Negative traffic volume detected: counter reset or interface restart"
            ),
            TrafficAnomaly::PacketCounterReset => write!(
                f,
                "Negative packet count detected: counter reset or inconsistent data"
            ),
            TrafficAnomaly::ElevatedErrors {
                errors_in,
                errors_out,
            } => write!(
                f,
                "Elevated network errors: {} in / {} out since last sample",
                errors_in, errors_out
            ),
            TrafficAnomaly::HighVolume {
                bytes_sent,
                bytes_received,
            } => write!(
                f,
                "High traffic volume: {} bytes sent / {} bytes received since last sample",
                bytes_sent, bytes_received
            ),
        }
    }
}

/// Thresholds applied to per-interval deltas.
#[derive(Debug, Clone, Copy)]
pub struct TrafficThresholds {
    pub bytes: u64,
    pub errors: u64,
}

impl From<&MonitoringConfig> for TrafficThresholds {
    fn from(config: &MonitoringConfig) -> Self {
        Self {
            bytes: config.traffic_bytes_threshold,
            errors: config.traffic_errors_threshold,
        }
    }
}

/// Compare two samples; the first matching rule wins.
pub fn analyze(
    prev: &TrafficSample,
    current: &TrafficSample,
    thresholds: TrafficThresholds,
) -> Option<TrafficAnomaly> {
    if current.bytes_sent < prev.bytes_sent || current.bytes_received < prev.bytes_received {
        return Some(TrafficAnomaly::ByteCounterReset);
    }
    if current.packets_sent < prev.packets_sent
        || current.packets_received < prev.packets_received
    {
        return Some(TrafficAnomaly::PacketCounterReset);
    }

    let errors_in = current.errors_in.saturating_sub(prev.errors_in);
    let errors_out = current.errors_out.saturating_sub(prev.errors_out);
    if errors_in > thresholds.errors || errors_out > thresholds.errors {
        return Some(TrafficAnomaly::ElevatedErrors {
            errors_in,
            errors_out,
        });
    }

    let bytes_sent = current.bytes_sent - prev.bytes_sent;
    let bytes_received = current.bytes_received - prev.bytes_received;
    if bytes_sent > thresholds.bytes || bytes_received > thresholds.bytes {
        return Some(TrafficAnomaly::HighVolume {
            bytes_sent,
            bytes_received,
        });
    }

    None
}

/// Stateful watcher holding the previous sample.
pub struct TrafficWatch {
    previous: Option<TrafficSample>,
    thresholds: TrafficThresholds,
}

impl TrafficWatch {
    pub fn new(thresholds: TrafficThresholds) -> Self {
        Self {
            previous: None,
            thresholds,
        }
    }

    /// Feed a new sample. The first sample only primes the watcher.
    pub fn observe(&mut self, sample: TrafficSample) -> Option<TrafficAnomaly> {
        let anomaly = self
            .previous
            .as_ref()
            .and_then(|prev| analyze(prev, &sample, self.thresholds));
        self.previous = Some(sample);

        if let Some(ref anomaly) = anomaly {
            tracing::warn!("Traffic anomaly: {}", anomaly);
        }
        anomaly
    }
}
