// Network module - link speed, local interfaces and public IP.

mod interfaces;
mod probe;
mod speedtest;

pub use interfaces::{interface_entries, list_interfaces, InterfaceAddress};
pub use probe::{NetworkProbe, NetworkSnapshot, NetworkSource};
pub use speedtest::{SpeedTest, SpeedTestResult};
