// Conversation shell end to end, with fake collaborators

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver};
use tokio_util::sync::CancellationToken;

use pi_eye::cli::{ConversationShell, Role, TranscriptView, Turn, TurnOutcome, INTERRUPTED_MARKER};
use pi_eye::monitoring::{MetricsSnapshot, MetricsSource, Mbps, Millis, Percent, Reading};
use pi_eye::network::{NetworkSnapshot, NetworkSource};
use pi_eye::pihole::PiholeClient;
use pi_eye::providers::{DemoResponder, ReplyGenerator};
use pi_eye::router::{ActionTag, Router};

struct FixedMetrics;

#[async_trait]
impl MetricsSource for FixedMetrics {
    async fn collect_system_metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_usage: Reading::Value(Percent(12.0)),
            ram_usage: Reading::Value(Percent(40.0)),
            disk_usage: Reading::Value(Percent(55.0)),
            cpu_temperature: Reading::NotAvailable,
        }
    }
}

struct FixedNetwork;

#[async_trait]
impl NetworkSource for FixedNetwork {
    async fn collect_network_status(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            download: Reading::Value(Mbps(45.67)),
            upload: Reading::Value(Mbps(9.5)),
            ping: Reading::Value(Millis(21.0)),
            interfaces: Vec::new(),
            external_ip: Reading::failed("external IP error: timed out"),
        }
    }
}

/// Replies with a fixed script of fragments, routing on the reply text.
struct ScriptedGenerator {
    fragments: Vec<Result<String, String>>,
    /// Keep the stream open after the script runs out.
    hang: bool,
}

impl ScriptedGenerator {
    fn replying(text: &str) -> Self {
        Self {
            fragments: vec![Ok(text.to_string())],
            hang: false,
        }
    }
}

#[async_trait]
impl ReplyGenerator for ScriptedGenerator {
    async fn stream_reply(&self, _transcript: &[Turn]) -> Result<Receiver<Result<String>>> {
        let (tx, rx) = mpsc::channel(8);
        let fragments = self.fragments.clone();
        let hang = self.hang;
        tokio::spawn(async move {
            for fragment in fragments {
                let item = fragment.map_err(|e| anyhow!(e));
                if tx.send(item).await.is_err() {
                    return;
                }
            }
            if hang {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        });
        Ok(rx)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct FailingGenerator;

#[async_trait]
impl ReplyGenerator for FailingGenerator {
    async fn stream_reply(&self, _transcript: &[Turn]) -> Result<Receiver<Result<String>>> {
        Err(anyhow!("Gemini API error (status 401)"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[derive(Default)]
struct RecordingView {
    shown: Vec<(Role, String)>,
    fragments: Vec<String>,
    finished: Vec<String>,
    notices: Vec<String>,
    activities: Vec<String>,
}

impl TranscriptView for RecordingView {
    fn show_turn(&mut self, turn: &Turn) {
        self.shown.push((turn.role, turn.content.clone()));
    }

    fn stream_fragment(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }

    fn stream_finished(&mut self, turn: &Turn) {
        self.finished.push(turn.content.clone());
    }

    fn show_notice(&mut self, notice: &str) {
        self.notices.push(notice.to_string());
    }

    fn begin_activity(&mut self, label: &str) {
        self.activities.push(label.to_string());
    }
}

fn unreachable_pihole() -> Result<PiholeClient, String> {
    Ok(PiholeClient::new(
        "http://127.0.0.1:1/admin/api.php",
        "token",
        Duration::from_secs(2),
    )
    .unwrap())
}

fn shell_with(generator: Box<dyn ReplyGenerator>, pihole: Result<PiholeClient, String>) -> ConversationShell {
    ConversationShell::new(
        generator,
        Router::default(),
        Box::new(FixedMetrics),
        Box::new(FixedNetwork),
        pihole,
    )
}

fn demo_shell() -> ConversationShell {
    shell_with(Box::new(DemoResponder::default()), unreachable_pihole())
}

#[tokio::test]
async fn test_pi_status_reports_metrics_in_order() {
    let mut shell = demo_shell();
    let mut view = RecordingView::default();

    let outcome = shell
        .handle_input("pi status", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Acted(ActionTag::PiStatus));

    let turns = shell.transcript().turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);

    let report = &turns[2].content;
    let positions: Vec<usize> = ["12.0%", "40.0%", "55.0%", "N/A"]
        .iter()
        .map(|needle| report.find(needle).expect(needle))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", report);
    assert!(report.contains("CPU Usage"));
    assert!(report.contains("CPU Temperature:** N/A"));

    assert_eq!(view.activities, vec!["Collecting system metrics"]);
    assert!(!view.fragments.is_empty());
}

#[tokio::test]
async fn test_enable_against_unreachable_pihole() {
    let mut shell = demo_shell();
    let mut view = RecordingView::default();

    let outcome = shell
        .handle_input("enable pi-hole", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Acted(ActionTag::PiholeEnable));

    let last = shell.transcript().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(
        last.content.starts_with("Failed to enable Pi-hole:"),
        "{}",
        last.content
    );
    assert!(!last.content.contains("token"));
}

#[tokio::test]
async fn test_network_status() {
    let mut shell = demo_shell();
    let mut view = RecordingView::default();

    shell
        .handle_input("How is the internet status?", &mut view, &CancellationToken::new())
        .await;

    let report = &shell.transcript().last().unwrap().content;
    assert!(report.contains("45.67 Mbps"));
    assert!(report.contains("21 ms"));
    assert!(report.contains("N/A (external IP error: timed out)"));
}

#[tokio::test]
async fn test_blacklist_without_domain_asks_for_one() {
    let mut shell = demo_shell();
    let mut view = RecordingView::default();

    let outcome = shell
        .handle_input("blacklist domain add", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Acted(ActionTag::BlacklistAdd));
    assert!(shell
        .transcript()
        .last()
        .unwrap()
        .content
        .starts_with("Please specify a domain to blacklist"));
}

#[tokio::test]
async fn test_pihole_disabled_notice() {
    let mut shell = shell_with(
        Box::new(DemoResponder::default()),
        Err("no API token configured".to_string()),
    );
    let mut view = RecordingView::default();

    let notice = shell.pihole_notice().unwrap();
    assert!(notice.contains("Pi-hole control is unavailable"));

    shell
        .handle_input("pihole summary", &mut view, &CancellationToken::new())
        .await;
    let last = &shell.transcript().last().unwrap().content;
    assert!(last.contains("no API token configured"));

    // Local reports still work without Pi-hole
    let outcome = shell
        .handle_input("system status", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Acted(ActionTag::PiStatus));
}

#[tokio::test]
async fn test_unmatched_prompt_is_answered_only() {
    let mut shell = demo_shell();
    let mut view = RecordingView::default();

    let outcome = shell
        .handle_input("tell me a joke", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Answered);
    assert_eq!(shell.transcript().len(), 2);
    assert!(view.activities.is_empty());
}

#[tokio::test]
async fn test_routes_on_reply_text() {
    let generator = ScriptedGenerator::replying("Sure, fetching the Raspberry Pi status now.");
    let mut shell = shell_with(Box::new(generator), unreachable_pihole());
    let mut view = RecordingView::default();

    // The prompt itself matches nothing; the reply carries the phrase
    let outcome = shell
        .handle_input("how is my little computer doing?", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Acted(ActionTag::PiStatus));
    assert_eq!(
        view.finished,
        vec!["Sure, fetching the Raspberry Pi status now."]
    );
}

#[tokio::test]
async fn test_cancelled_reply_is_marked_and_not_routed() {
    let generator = ScriptedGenerator {
        fragments: vec![Ok("Checking the pi status ".to_string())],
        hang: true,
    };
    let mut shell = shell_with(Box::new(generator), unreachable_pihole());
    let mut view = RecordingView::default();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let outcome = shell.handle_input("pi status", &mut view, &cancel).await;
    assert_eq!(outcome, TurnOutcome::Interrupted);

    let last = shell.transcript().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.starts_with("Checking the pi status"));
    assert!(last.content.ends_with(INTERRUPTED_MARKER));
    assert_eq!(shell.transcript().len(), 2);
    assert!(view.activities.is_empty());
}

#[tokio::test]
async fn test_model_failure_becomes_reply() {
    let mut shell = shell_with(Box::new(FailingGenerator), unreachable_pihole());
    let mut view = RecordingView::default();

    let outcome = shell
        .handle_input("pi status", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::ModelFailed);

    let last = shell.transcript().last().unwrap();
    assert!(last.content.contains("couldn't get a reply"));
    assert!(last.content.contains("401"));
    assert_eq!(shell.transcript().len(), 2);
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_text() {
    let generator = ScriptedGenerator {
        fragments: vec![
            Ok("Let me check".to_string()),
            Err("stream reset".to_string()),
        ],
        hang: false,
    };
    let mut shell = shell_with(Box::new(generator), unreachable_pihole());
    let mut view = RecordingView::default();

    let outcome = shell
        .handle_input("hello", &mut view, &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::ModelFailed);

    let content = &shell.transcript().last().unwrap().content;
    assert!(content.starts_with("Let me check"));
    assert!(content.contains("stream reset"));
}

#[tokio::test]
async fn test_reply_then_act() {
    let mut shell = demo_shell();
    let mut view = RecordingView::default();
    let cancel = CancellationToken::new();

    let routed = shell.reply("pi status", &mut view, &cancel).await;
    let ControlFlow::Continue(routed_text) = routed else {
        panic!("expected a routable reply, got {:?}", routed);
    };
    assert_eq!(routed_text, "pi status");
    assert_eq!(shell.transcript().len(), 2);

    // Cancelling after the reply has no effect on the action
    cancel.cancel();
    let outcome = shell.act("pi status", &routed_text, &mut view).await;
    assert_eq!(outcome, TurnOutcome::Acted(ActionTag::PiStatus));
    assert!(shell
        .transcript()
        .last()
        .unwrap()
        .content
        .contains("CPU Usage"));
}

#[tokio::test]
async fn test_reply_breaks_when_cancelled() {
    let generator = ScriptedGenerator {
        fragments: Vec::new(),
        hang: true,
    };
    let mut shell = shell_with(Box::new(generator), unreachable_pihole());
    let mut view = RecordingView::default();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let routed = shell.reply("network status", &mut view, &cancel).await;
    assert_eq!(routed, ControlFlow::Break(TurnOutcome::Interrupted));
    assert_eq!(
        shell.transcript().last().unwrap().content,
        INTERRUPTED_MARKER.trim_start()
    );
    assert!(view.activities.is_empty());
}
