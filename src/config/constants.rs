// Project-wide constants
//
// Centralised here so endpoint URLs and other magic values have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Directory under $HOME holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = ".pi-eye";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Pi-hole request timeout.
pub const DEFAULT_PIHOLE_TIMEOUT_SECS: u64 = 10;

/// How long "disable pi-hole" pauses blocking for.
pub const DEFAULT_DISABLE_SECS: u64 = 30;

/// Cloudflare's public speed test endpoints.
pub const DEFAULT_SPEEDTEST_DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down";
pub const DEFAULT_SPEEDTEST_UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";

pub const DEFAULT_DOWNLOAD_BYTES: u64 = 10_000_000;
pub const DEFAULT_UPLOAD_BYTES: u64 = 2_000_000;

/// The upload body is held in memory; keep it well inside a 32-bit address space.
pub const MAX_UPLOAD_BYTES: u64 = 100_000_000;

/// Plain-text public IP echo service.
pub const DEFAULT_EXTERNAL_IP_URL: &str = "https://api.ipify.org";

/// Upper bound for each speed test / IP lookup request.
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 30;

/// Sampling interval for `pi-eye watch`.
pub const DEFAULT_MONITORING_INTERVAL_SECS: u64 = 2;

/// Per-interval byte delta that counts as a traffic spike.
pub const DEFAULT_TRAFFIC_BYTES_THRESHOLD: u64 = 1_000_000;

/// Per-interval error delta that counts as elevated errors.
pub const DEFAULT_TRAFFIC_ERRORS_THRESHOLD: u64 = 1_000;

/// Gemini REST endpoint and default model.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Model request timeout.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
