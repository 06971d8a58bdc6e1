// HTTP speed test
//
// Ping is the best of a few zero-byte downloads, download is a streamed
// fetch of a fixed payload, upload is a POST of a zero-filled body.

use anyhow::{bail, Context, Result};
use futures::stream::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};

use crate::config::NetworkConfig;
use crate::monitoring::{Mbps, Millis};

const PING_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedTestResult {
    pub download: Mbps,
    pub upload: Mbps,
    pub ping: Millis,
}

pub struct SpeedTest {
    client: Client,
    download_url: String,
    upload_url: String,
    download_bytes: u64,
    upload_bytes: u64,
}

impl SpeedTest {
    pub fn new(client: Client, config: &NetworkConfig) -> Self {
        Self {
            client,
            download_url: config.speedtest_download_url.clone(),
            upload_url: config.speedtest_upload_url.clone(),
            download_bytes: config.download_bytes,
            upload_bytes: config.upload_bytes,
        }
    }

    /// Run ping, download and upload in that order.
    pub async fn run(&self) -> Result<SpeedTestResult> {
        let ping = self.measure_ping().await?;
        let download = self.measure_download().await?;
        let upload = self.measure_upload().await?;

        tracing::debug!(
            "Speed test finished: down {} / up {} / ping {}",
            download,
            upload,
            ping
        );

        Ok(SpeedTestResult {
            download,
            upload,
            ping,
        })
    }

    async fn measure_ping(&self) -> Result<Millis> {
        let mut best: Option<Duration> = None;

        for _ in 0..PING_ATTEMPTS {
            let start = Instant::now();
            self.client
                .get(&self.download_url)
                .query(&[("bytes", "0")])
                .send()
                .await
                .context("ping request failed")?
                .error_for_status()
                .context("ping request rejected")?;
            let elapsed = start.elapsed();
            best = Some(best.map_or(elapsed, |b| b.min(elapsed)));
        }

        let best = best.unwrap_or_default();
        Ok(Millis(best.as_secs_f64() * 1000.0))
    }

    async fn measure_download(&self) -> Result<Mbps> {
        let start = Instant::now();
        let response = self
            .client
            .get(&self.download_url)
            .query(&[("bytes", self.download_bytes.to_string())])
            .send()
            .await
            .context("download request failed")?
            .error_for_status()
            .context("download request rejected")?;

        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("download interrupted")?;
            received += chunk.len() as u64;
        }

        if received == 0 {
            bail!("download returned no data");
        }

        Ok(Mbps::from_transfer(received, start.elapsed().as_secs_f64()))
    }

    async fn measure_upload(&self) -> Result<Mbps> {
        let len = usize::try_from(self.upload_bytes)
            .context("upload size does not fit in memory on this platform")?;
        let body = vec![0u8; len];
        let start = Instant::now();

        self.client
            .post(&self.upload_url)
            .header("content-type", "application/octet-stream")
            .body(body)
            .send()
            .await
            .context("upload request failed")?
            .error_for_status()
            .context("upload request rejected")?;

        Ok(Mbps::from_transfer(
            self.upload_bytes,
            start.elapsed().as_secs_f64(),
        ))
    }
}
