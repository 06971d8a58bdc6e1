// System monitoring - CPU, memory, disk, temperature and traffic counters

mod reading;
mod system;
pub mod traffic;

pub use reading::{Celsius, Mbps, Millis, Percent, Reading};
pub use system::{
    find_temperature, percent_of, root_disk_usage, MetricsSnapshot, MetricsSource, SystemMonitor,
};
pub use traffic::{TrafficAnomaly, TrafficSample, TrafficThresholds, TrafficWatch};
