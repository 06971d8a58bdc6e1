// pi-eye - chat agent for a Raspberry Pi, its network link and Pi-hole
// Library exports

pub mod cli;
pub mod config;
pub mod formatter;
pub mod monitoring;
pub mod network;
pub mod pihole;
pub mod providers;
pub mod router;
