// `pi-eye watch` - periodic traffic sampling with anomaly alerts

use anyhow::Result;
use chrono::Local;
use crossterm::style::Stylize;
use std::io::{self, IsTerminal};
use std::time::Duration;

use crate::config::MonitoringConfig;
use crate::monitoring::{TrafficAnomaly, TrafficSample, TrafficThresholds, TrafficWatch};

/// Sample interface totals until Ctrl-C, printing one line per interval.
pub async fn run_watch(config: &MonitoringConfig, interval_override: Option<u64>) -> Result<()> {
    let secs = interval_override.unwrap_or(config.interval_seconds).max(1);
    let color = io::stdout().is_terminal();
    let mut watch = TrafficWatch::new(TrafficThresholds::from(config));
    let mut ticker = tokio::time::interval(Duration::from_secs(secs));
    let mut previous: Option<TrafficSample> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("Watching network traffic every {}s (Ctrl-C to stop)", secs);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let sample = TrafficSample::capture();
                let anomaly = watch.observe(sample);
                if let Some(prev) = previous {
                    let time = Local::now().format("%H:%M:%S").to_string();
                    let line = status_line(&time, &sample.delta_since(&prev), anomaly.as_ref());
                    if color && anomaly.is_some() {
                        println!("{}", line.yellow());
                    } else {
                        println!("{}", line);
                    }
                }
                previous = Some(sample);
            }
        }
    }

    tracing::debug!("Traffic watch stopped");
    Ok(())
}

/// One line of watch output for a per-interval delta.
pub fn status_line(time: &str, delta: &TrafficSample, anomaly: Option<&TrafficAnomaly>) -> String {
    let mut line = format!(
        "[{}] sent {} ({} pkts), received {} ({} pkts), errors {} in / {} out",
        time,
        human_bytes(delta.bytes_sent),
        delta.packets_sent,
        human_bytes(delta.bytes_received),
        delta.packets_received,
        delta.errors_in,
        delta.errors_out
    );
    if let Some(anomaly) = anomaly {
        line.push_str(&format!("  ALERT: {}", anomaly));
    }
    line
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(999), "999 B");
        assert_eq!(human_bytes(1_500), "1.5 KB");
        assert_eq!(human_bytes(2_000_000), "2.0 MB");
        assert_eq!(human_bytes(3_200_000_000), "3.2 GB");
    }

    #[test]
    fn test_status_line() {
        let delta = TrafficSample {
            bytes_sent: 1_500,
            bytes_received: 2_000_000,
            packets_sent: 10,
            packets_received: 1_400,
            errors_in: 0,
            errors_out: 0,
        };
        let quiet = status_line("12:00:00", &delta, None);
        assert_eq!(
            quiet,
            "[12:00:00] sent 1.5 KB (10 pkts), received 2.0 MB (1400 pkts), errors 0 in / 0 out"
        );

        let anomaly = TrafficAnomaly::HighVolume {
            bytes_sent: 1_500,
            bytes_received: 2_000_000,
        };
        let alert = status_line("12:00:00", &delta, Some(&anomaly));
        assert!(alert.contains("ALERT: High traffic volume"));
    }
}
