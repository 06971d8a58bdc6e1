// Configuration loader
// Loads settings from ~/.pi-eye/config.toml (or an explicit path) and fills
// missing secrets from environment variables

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::Config;

/// Load configuration.
///
/// An explicit `path` must exist. Without one, `~/.pi-eye/config.toml` is used
/// when present and defaults otherwise; environment variables fill in
/// whatever the file leaves out.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            read_config_file(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// `~/.pi-eye/config.toml`, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Parse TOML text into a [`Config`].
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Failed to parse configuration TOML")
}

fn read_config_file(path: &Path) -> Result<Config> {
    tracing::debug!("Loading configuration from {}", path.display());

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

    parse_config(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Fill unset secrets from `PIHOLE_API_URL`, `PIHOLE_API_TOKEN` and
/// `GEMINI_API_KEY`. Values from the file always win.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if config.pihole.url.is_none() {
        config.pihole.url = non_empty("PIHOLE_API_URL");
    }
    if config.pihole.token.is_none() {
        config.pihole.token = non_empty("PIHOLE_API_TOKEN");
    }
    if config.model.api_key.is_none() {
        config.model.api_key = non_empty("GEMINI_API_KEY");
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelProvider;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [pihole]
            url = "http://192.168.1.2/admin/api.php"
            token = "abc123"
            disable_seconds = 60

            [network]
            external_ip_url = "http://localhost:9000/ip"

            [monitoring]
            interval_seconds = 5
            temperature_sensors = ["soc_thermal"]

            [model]
            provider = "demo"

            [features]
            streaming_enabled = false

            [[intents]]
            phrase = "how hot"
            action = "pi_status"
            "#,
        )
        .unwrap();

        assert_eq!(config.pihole.token.as_deref(), Some("abc123"));
        assert_eq!(config.pihole.disable_seconds, 60);
        assert_eq!(config.pihole.timeout_seconds, 10);
        assert_eq!(config.network.external_ip_url, "http://localhost:9000/ip");
        assert_eq!(config.monitoring.interval_seconds, 5);
        assert_eq!(config.monitoring.temperature_sensors, vec!["soc_thermal"]);
        assert_eq!(config.model.provider, ModelProvider::Demo);
        assert!(!config.features.streaming_enabled);
        assert_eq!(config.intents.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.pihole.url.is_none());
        assert_eq!(config.model.provider, ModelProvider::Gemini);
        assert!(config.features.streaming_enabled);
    }

    #[test]
    fn test_zero_disable_seconds_from_toml() {
        let config = parse_config("[pihole]\ndisable_seconds = 0\n").unwrap();
        assert_eq!(config.pihole.disable_duration(), None);

        let config = parse_config("[pihole]\n").unwrap();
        assert_eq!(config.pihole.disable_duration(), Some(30));
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(parse_config("[pihole\nurl = ").is_err());
    }

    #[test]
    fn test_env_fills_missing_values_only() {
        let env: HashMap<&str, &str> = [
            ("PIHOLE_API_URL", "http://env/admin/api.php"),
            ("PIHOLE_API_TOKEN", "env-token"),
            ("GEMINI_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.pihole.token = Some("file-token".to_string());

        let config = apply_env_overrides(config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.pihole.url.as_deref(), Some("http://env/admin/api.php"));
        assert_eq!(config.pihole.token.as_deref(), Some("file-token"));
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn test_explicit_missing_path_errors() {
        let result = load_config(Some(Path::new("/nonexistent/pi-eye/config.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[pihole]\nurl = \"http://pi.hole/admin/api.php\"\ntoken = \"t\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.pihole.credentials().is_ok());
    }
}
