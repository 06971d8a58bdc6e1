// System metrics - CPU, RAM, root disk and CPU temperature

use async_trait::async_trait;
use std::path::Path;
use sysinfo::{Components, Disks, System};

use super::reading::{Celsius, Percent, Reading};
use crate::config::MonitoringConfig;

/// One fresh reading of the local machine. Never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub cpu_usage: Reading<Percent>,
    pub ram_usage: Reading<Percent>,
    pub disk_usage: Reading<Percent>,
    pub cpu_temperature: Reading<Celsius>,
}

/// Anything that can produce a [`MetricsSnapshot`].
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn collect_system_metrics(&self) -> MetricsSnapshot;
}

/// sysinfo-backed collector.
pub struct SystemMonitor {
    temperature_sensors: Vec<String>,
}

impl SystemMonitor {
    pub fn new(config: &MonitoringConfig) -> Self {
        Self {
            temperature_sensors: config.temperature_sensors.clone(),
        }
    }

    async fn sample_cpu() -> Reading<Percent> {
        // sysinfo computes usage between two refreshes
        let mut system = System::new();
        system.refresh_cpu_usage();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        system.refresh_cpu_usage();

        if system.cpus().is_empty() {
            return Reading::failed("no CPUs reported");
        }

        let usage = system.global_cpu_usage() as f64;
        if usage.is_finite() {
            Reading::Value(Percent(usage))
        } else {
            Reading::failed("invalid CPU sample")
        }
    }

    fn sample_memory() -> Reading<Percent> {
        let mut system = System::new();
        system.refresh_memory();
        percent_of(system.used_memory(), system.total_memory())
    }

    fn sample_disk() -> Reading<Percent> {
        let disks = Disks::new_with_refreshed_list();
        let volumes: Vec<(&Path, u64, u64)> = disks
            .list()
            .iter()
            .map(|d| (d.mount_point(), d.total_space(), d.available_space()))
            .collect();
        root_disk_usage(&volumes)
    }

    fn sample_temperature(&self) -> Reading<Celsius> {
        let components = Components::new_with_refreshed_list();
        let sensors: Vec<(String, f32)> = components
            .list()
            .iter()
            .map(|c| (c.label().to_string(), c.temperature()))
            .collect();
        find_temperature(&sensors, &self.temperature_sensors)
    }
}

#[async_trait]
impl MetricsSource for SystemMonitor {
    async fn collect_system_metrics(&self) -> MetricsSnapshot {
        let cpu_usage = Self::sample_cpu().await;
        let snapshot = MetricsSnapshot {
            cpu_usage,
            ram_usage: Self::sample_memory(),
            disk_usage: Self::sample_disk(),
            cpu_temperature: self.sample_temperature(),
        };
        tracing::debug!("Collected system metrics: {:?}", snapshot);
        snapshot
    }
}

/// `used / total` as a percentage; a zero total is a failed reading.
pub fn percent_of(used: u64, total: u64) -> Reading<Percent> {
    if total == 0 {
        return Reading::failed("total reported as zero");
    }
    Reading::Value(Percent(used as f64 * 100.0 / total as f64))
}

/// Usage of the volume mounted at `/`, or the first listed volume.
///
/// Each entry is `(mount point, total bytes, available bytes)`.
pub fn root_disk_usage(volumes: &[(&Path, u64, u64)]) -> Reading<Percent> {
    let chosen = volumes
        .iter()
        .find(|(mount, _, _)| *mount == Path::new("/"))
        .or_else(|| volumes.first());

    match chosen {
        Some((_, total, available)) => percent_of(total.saturating_sub(*available), *total),
        None => Reading::failed("no disks found"),
    }
}

/// First sensor whose label contains one of `names` (in `names` order).
pub fn find_temperature(sensors: &[(String, f32)], names: &[String]) -> Reading<Celsius> {
    for name in names {
        let found = sensors
            .iter()
            .find(|(label, temp)| label.contains(name.as_str()) && temp.is_finite());
        if let Some((label, temp)) = found {
            tracing::debug!("Using temperature sensor '{}'", label);
            return Reading::Value(Celsius(*temp));
        }
    }
    Reading::NotAvailable
}
