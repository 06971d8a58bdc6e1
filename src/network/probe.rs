// Network probe - speed test, interfaces and public IP in one snapshot

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;

use super::interfaces::{list_interfaces, InterfaceAddress};
use super::speedtest::SpeedTest;
use crate::config::NetworkConfig;
use crate::monitoring::{Mbps, Millis, Reading};

/// One fresh look at the network link. Never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshot {
    pub download: Reading<Mbps>,
    pub upload: Reading<Mbps>,
    pub ping: Reading<Millis>,
    pub interfaces: Vec<InterfaceAddress>,
    pub external_ip: Reading<IpAddr>,
}

/// Anything that can produce a [`NetworkSnapshot`].
#[async_trait]
pub trait NetworkSource: Send + Sync {
    async fn collect_network_status(&self) -> NetworkSnapshot;
}

pub struct NetworkProbe {
    client: Client,
    speed_test: SpeedTest,
    external_ip_url: String,
}

impl NetworkProbe {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            speed_test: SpeedTest::new(client.clone(), config),
            client,
            external_ip_url: config.external_ip_url.clone(),
        })
    }

    async fn speed(&self) -> (Reading<Mbps>, Reading<Mbps>, Reading<Millis>) {
        match self.speed_test.run().await {
            Ok(result) => (
                Reading::Value(result.download),
                Reading::Value(result.upload),
                Reading::Value(result.ping),
            ),
            Err(e) => {
                tracing::warn!("Speed test failed: {:#}", e);
                let reason = format!("speed test error: {}", e);
                (
                    Reading::failed(reason.clone()),
                    Reading::failed(reason.clone()),
                    Reading::failed(reason),
                )
            }
        }
    }

    async fn external_ip(&self) -> Reading<IpAddr> {
        match self.fetch_external_ip().await {
            Ok(ip) => Reading::Value(ip),
            Err(e) => {
                tracing::warn!("External IP lookup failed: {:#}", e);
                Reading::failed(format!("external IP error: {}", e))
            }
        }
    }

    async fn fetch_external_ip(&self) -> Result<IpAddr> {
        let body = self
            .client
            .get(&self.external_ip_url)
            .send()
            .await
            .context("IP echo request failed")?
            .error_for_status()
            .context("IP echo request rejected")?
            .text()
            .await
            .context("Failed to read IP echo response")?;

        body.trim()
            .parse::<IpAddr>()
            .with_context(|| format!("IP echo returned '{}'", body.trim()))
    }
}

#[async_trait]
impl NetworkSource for NetworkProbe {
    async fn collect_network_status(&self) -> NetworkSnapshot {
        // Each step reports its own failure; none short-circuits the others
        let (download, upload, ping) = self.speed().await;
        let interfaces = list_interfaces();
        let external_ip = self.external_ip().await;

        NetworkSnapshot {
            download,
            upload,
            ping,
            interfaces,
            external_ip,
        }
    }
}
