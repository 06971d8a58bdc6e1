// Network probe against mock speed test and IP echo endpoints

use mockito::{Matcher, Server, ServerGuard};
use std::net::IpAddr;

use pi_eye::config::NetworkConfig;
use pi_eye::formatter::format_network;
use pi_eye::monitoring::Reading;
use pi_eye::network::{NetworkProbe, NetworkSource, SpeedTest};

fn config_for(server: &ServerGuard) -> NetworkConfig {
    NetworkConfig {
        speedtest_download_url: format!("{}/__down", server.url()),
        speedtest_upload_url: format!("{}/__up", server.url()),
        download_bytes: 4_096,
        upload_bytes: 2_048,
        external_ip_url: format!("{}/ip", server.url()),
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn test_full_snapshot() {
    let mut server = Server::new_async().await;
    let ping = server
        .mock("GET", "/__down")
        .match_query(Matcher::UrlEncoded("bytes".into(), "0".into()))
        .with_status(200)
        .with_body("")
        .expect(3)
        .create_async()
        .await;
    let download = server
        .mock("GET", "/__down")
        .match_query(Matcher::UrlEncoded("bytes".into(), "4096".into()))
        .with_status(200)
        .with_body(vec![0u8; 4_096])
        .expect(1)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/__up")
        .match_header("content-type", "application/octet-stream")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/ip")
        .with_status(200)
        .with_body("203.0.113.45\n")
        .create_async()
        .await;

    let probe = NetworkProbe::new(&config_for(&server)).unwrap();
    let snapshot = probe.collect_network_status().await;

    assert!(snapshot.download.is_value());
    assert!(snapshot.upload.is_value());
    assert!(snapshot.ping.is_value());
    assert_eq!(
        snapshot.external_ip,
        Reading::Value("203.0.113.45".parse::<IpAddr>().unwrap())
    );

    ping.assert_async().await;
    download.assert_async().await;
    upload.assert_async().await;

    let formatted = format_network(&snapshot);
    assert!(formatted.contains("Mbps"));
    assert!(formatted.contains("External IP:** 203.0.113.45"));
}

#[tokio::test]
async fn test_speed_test_failure_is_independent() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/__down")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    server
        .mock("GET", "/ip")
        .with_status(200)
        .with_body("198.51.100.7")
        .create_async()
        .await;

    let probe = NetworkProbe::new(&config_for(&server)).unwrap();
    let snapshot = probe.collect_network_status().await;

    for reading in [
        snapshot.download.to_string(),
        snapshot.upload.to_string(),
        snapshot.ping.to_string(),
    ] {
        assert!(
            reading.starts_with("N/A (speed test error"),
            "unexpected reading: {}",
            reading
        );
    }
    assert_eq!(
        snapshot.external_ip,
        Reading::Value("198.51.100.7".parse::<IpAddr>().unwrap())
    );
}

#[tokio::test]
async fn test_external_ip_failure_is_independent() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/__down")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(vec![1u8; 64])
        .create_async()
        .await;
    server
        .mock("POST", "/__up")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/ip")
        .with_status(200)
        .with_body("not an address")
        .create_async()
        .await;

    let probe = NetworkProbe::new(&config_for(&server)).unwrap();
    let snapshot = probe.collect_network_status().await;

    assert!(snapshot.download.is_value());
    assert!(matches!(snapshot.external_ip, Reading::Failed(_)));
    assert!(snapshot
        .external_ip
        .to_string()
        .starts_with("N/A (external IP error"));
}

#[tokio::test]
async fn test_empty_download_is_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/__down")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let speed_test = SpeedTest::new(client, &config_for(&server));
    let err = speed_test.run().await.unwrap_err();
    assert!(err.to_string().contains("no data"));
}
