// Configuration structs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::constants::*;
use crate::router::ActionTag;

/// Pi-hole API access.
///
/// `url` and `token` are optional so that a missing section can be detected
/// once at startup and turned into a "feature disabled" notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiholeConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_pihole_timeout")]
    pub timeout_seconds: u64,

    /// Duration passed as `time=` when disabling. `0` disables until
    /// blocking is enabled again.
    #[serde(default = "default_disable_seconds")]
    pub disable_seconds: u64,
}

impl Default for PiholeConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_seconds: DEFAULT_PIHOLE_TIMEOUT_SECS,
            disable_seconds: DEFAULT_DISABLE_SECS,
        }
    }
}

impl PiholeConfig {
    /// Returns `(url, token)` when both are present and non-empty,
    /// otherwise a human-readable reason.
    pub fn credentials(&self) -> Result<(&str, &str), String> {
        let url = self.url.as_deref().map(str::trim).unwrap_or_default();
        let token = self.token.as_deref().map(str::trim).unwrap_or_default();

        match (url.is_empty(), token.is_empty()) {
            (false, false) => Ok((url, token)),
            (true, true) => Err("no Pi-hole API URL or token configured".to_string()),
            (true, false) => Err("no Pi-hole API URL configured".to_string()),
            (false, true) => Err("no Pi-hole API token configured".to_string()),
        }
    }

    /// How long "disable pi-hole" pauses blocking; `None` means indefinitely.
    pub fn disable_duration(&self) -> Option<u64> {
        Some(self.disable_seconds).filter(|&secs| secs > 0)
    }
}

/// Speed test and public IP lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_download_url")]
    pub speedtest_download_url: String,

    #[serde(default = "default_upload_url")]
    pub speedtest_upload_url: String,

    #[serde(default = "default_download_bytes")]
    pub download_bytes: u64,

    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: u64,

    #[serde(default = "default_external_ip_url")]
    pub external_ip_url: String,

    #[serde(default = "default_network_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            speedtest_download_url: DEFAULT_SPEEDTEST_DOWNLOAD_URL.to_string(),
            speedtest_upload_url: DEFAULT_SPEEDTEST_UPLOAD_URL.to_string(),
            download_bytes: DEFAULT_DOWNLOAD_BYTES,
            upload_bytes: DEFAULT_UPLOAD_BYTES,
            external_ip_url: DEFAULT_EXTERNAL_IP_URL.to_string(),
            timeout_seconds: DEFAULT_NETWORK_TIMEOUT_SECS,
        }
    }
}

/// Local metrics and `watch` settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Sensor labels searched (substring match) for the CPU temperature.
    #[serde(default = "default_temperature_sensors")]
    pub temperature_sensors: Vec<String>,

    #[serde(default = "default_bytes_threshold")]
    pub traffic_bytes_threshold: u64,

    #[serde(default = "default_errors_threshold")]
    pub traffic_errors_threshold: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_MONITORING_INTERVAL_SECS,
            temperature_sensors: default_temperature_sensors(),
            traffic_bytes_threshold: DEFAULT_TRAFFIC_BYTES_THRESHOLD,
            traffic_errors_threshold: DEFAULT_TRAFFIC_ERRORS_THRESHOLD,
        }
    }
}

/// Which reply generator backs the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Gemini,
    Demo,
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: ModelProvider,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the Gemini endpoint (tests, proxies).
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: i32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: i32,

    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,

    /// Replaces the built-in system instruction when set.
    #[serde(default)]
    pub system_instruction: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::default(),
            api_key: None,
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: DEFAULT_MODEL_TIMEOUT_SECS,
            system_instruction: None,
        }
    }
}

/// Feature flags configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Stream model replies fragment by fragment
    #[serde(default = "default_true")]
    pub streaming_enabled: bool,

    /// Enable debug logging for troubleshooting
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            streaming_enabled: true,
            debug_logging: false,
        }
    }
}

/// One `[[intents]]` entry: a phrase and the action it selects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentEntry {
    pub phrase: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pihole: PiholeConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub features: FeaturesConfig,

    /// Replaces the default keyword table when non-empty (order = precedence)
    #[serde(default)]
    pub intents: Vec<IntentEntry>,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pihole.timeout_seconds == 0 {
            anyhow::bail!("pihole.timeout_seconds must be greater than zero");
        }
        if self.network.timeout_seconds == 0 {
            anyhow::bail!("network.timeout_seconds must be greater than zero");
        }
        if self.model.timeout_seconds == 0 {
            anyhow::bail!("model.timeout_seconds must be greater than zero");
        }
        if self.monitoring.interval_seconds == 0 {
            anyhow::bail!("monitoring.interval_seconds must be greater than zero");
        }
        if self.network.upload_bytes > MAX_UPLOAD_BYTES {
            anyhow::bail!(
                "network.upload_bytes must be at most {} (got {})",
                MAX_UPLOAD_BYTES,
                self.network.upload_bytes
            );
        }

        for (idx, entry) in self.intents.iter().enumerate() {
            if entry.phrase.trim().is_empty() {
                anyhow::bail!("intents[{}] has an empty phrase", idx);
            }
            if let Err(e) = ActionTag::from_str(&entry.action) {
                anyhow::bail!("intents[{}]: {}", idx, e);
            }
        }

        Ok(())
    }

    /// The keyword table the router should be built with, if overridden.
    pub fn keyword_table(&self) -> Option<Vec<(String, ActionTag)>> {
        if self.intents.is_empty() {
            return None;
        }
        self.intents
            .iter()
            .map(|entry| {
                ActionTag::from_str(&entry.action)
                    .ok()
                    .map(|tag| (entry.phrase.to_lowercase(), tag))
            })
            .collect()
    }
}

fn default_true() -> bool {
    true
}

fn default_pihole_timeout() -> u64 {
    DEFAULT_PIHOLE_TIMEOUT_SECS
}

fn default_disable_seconds() -> u64 {
    DEFAULT_DISABLE_SECS
}

fn default_download_url() -> String {
    DEFAULT_SPEEDTEST_DOWNLOAD_URL.to_string()
}

fn default_upload_url() -> String {
    DEFAULT_SPEEDTEST_UPLOAD_URL.to_string()
}

fn default_download_bytes() -> u64 {
    DEFAULT_DOWNLOAD_BYTES
}

fn default_upload_bytes() -> u64 {
    DEFAULT_UPLOAD_BYTES
}

fn default_external_ip_url() -> String {
    DEFAULT_EXTERNAL_IP_URL.to_string()
}

fn default_network_timeout() -> u64 {
    DEFAULT_NETWORK_TIMEOUT_SECS
}

fn default_interval() -> u64 {
    DEFAULT_MONITORING_INTERVAL_SECS
}

fn default_temperature_sensors() -> Vec<String> {
    vec!["cpu_thermal".to_string(), "cpu-thermal".to_string()]
}

fn default_bytes_threshold() -> u64 {
    DEFAULT_TRAFFIC_BYTES_THRESHOLD
}

fn default_errors_threshold() -> u64 {
    DEFAULT_TRAFFIC_ERRORS_THRESHOLD
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> i32 {
    40
}

fn default_max_output_tokens() -> i32 {
    2048
}

fn default_model_timeout() -> u64 {
    DEFAULT_MODEL_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pihole.disable_seconds, 30);
        assert_eq!(config.pihole.disable_duration(), Some(30));
        assert_eq!(config.monitoring.temperature_sensors.len(), 2);
        assert!(config.keyword_table().is_none());
    }

    #[test]
    fn test_credentials_missing() {
        let mut pihole = PiholeConfig::default();
        assert!(pihole.credentials().unwrap_err().contains("URL or token"));

        pihole.url = Some("http://pi.hole/admin/api.php".to_string());
        assert!(pihole.credentials().unwrap_err().contains("token"));

        pihole.token = Some("   ".to_string());
        assert!(pihole.credentials().is_err());

        pihole.token = Some("secret".to_string());
        assert_eq!(
            pihole.credentials().unwrap(),
            ("http://pi.hole/admin/api.php", "secret")
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.pihole.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_disable_means_indefinite() {
        let pihole = PiholeConfig {
            disable_seconds: 0,
            ..PiholeConfig::default()
        };
        assert_eq!(pihole.disable_duration(), None);
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let mut config = Config::default();
        config.network.upload_bytes = MAX_UPLOAD_BYTES;
        assert!(config.validate().is_ok());

        config.network.upload_bytes = MAX_UPLOAD_BYTES + 1;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("network.upload_bytes"));
    }

    #[test]
    fn test_unknown_intent_action_rejected() {
        let mut config = Config::default();
        config.intents.push(IntentEntry {
            phrase: "reboot".to_string(),
            action: "reboot_pi".to_string(),
        });
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("intents[0]"));
    }

    #[test]
    fn test_keyword_table_override_is_lowercased() {
        let mut config = Config::default();
        config.intents.push(IntentEntry {
            phrase: "How Is The Pi".to_string(),
            action: "pi_status".to_string(),
        });
        let table = config.keyword_table().unwrap();
        assert_eq!(table, vec![("how is the pi".to_string(), ActionTag::PiStatus)]);
    }
}
