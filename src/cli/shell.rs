// Conversation shell - transcript plus the per-input pipeline
//
// user turn -> streamed reply (cancellable) -> assistant turn -> route ->
// dispatch -> formatted result as a second assistant turn.

use anyhow::Result;
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;

use super::conversation::{Transcript, Turn};
use super::view::{TranscriptView, INTERRUPTED_MARKER};
use crate::config::constants::DEFAULT_DISABLE_SECS;
use crate::config::Config;
use crate::formatter::{
    format_blacklist, format_disabled_feature, format_metrics, format_missing_domain,
    format_network, format_status, format_summary, format_toggle, format_top_blocked, Toggle,
};
use crate::monitoring::{MetricsSource, SystemMonitor};
use crate::network::{NetworkProbe, NetworkSource};
use crate::pihole::PiholeClient;
use crate::providers::ReplyGenerator;
use crate::router::{ActionTag, RouteDecision, Router};

/// How a single input ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Reply only; no action phrase matched.
    Answered,
    /// Reply followed by the result of a routed action.
    Acted(ActionTag),
    /// Cancelled while streaming; routing skipped.
    Interrupted,
    /// The reply generator failed; the error became the reply.
    ModelFailed,
}

enum Reply {
    Complete(String),
    Interrupted(String),
    Failed(String),
}

pub struct ConversationShell {
    transcript: Transcript,
    generator: Box<dyn ReplyGenerator>,
    router: Router,
    metrics: Box<dyn MetricsSource>,
    network: Box<dyn NetworkSource>,
    /// `Err` holds why Pi-hole control is unavailable.
    pihole: Result<PiholeClient, String>,
    disable_seconds: Option<u64>,
}

impl ConversationShell {
    pub fn new(
        generator: Box<dyn ReplyGenerator>,
        router: Router,
        metrics: Box<dyn MetricsSource>,
        network: Box<dyn NetworkSource>,
        pihole: Result<PiholeClient, String>,
    ) -> Self {
        Self {
            transcript: Transcript::new(),
            generator,
            router,
            metrics,
            network,
            pihole,
            disable_seconds: Some(DEFAULT_DISABLE_SECS),
        }
    }

    /// Wire up the real collaborators from configuration.
    pub fn from_config(config: &Config, generator: Box<dyn ReplyGenerator>) -> Result<Self> {
        let router = config.keyword_table().map(Router::new).unwrap_or_default();
        let metrics = Box::new(SystemMonitor::new(&config.monitoring));
        let network = Box::new(NetworkProbe::new(&config.network)?);
        let pihole = PiholeClient::from_config(&config.pihole).map_err(|e| format!("{:#}", e));

        if let Err(reason) = &pihole {
            tracing::warn!("Pi-hole control disabled: {}", reason);
        }

        Ok(Self::new(generator, router, metrics, network, pihole)
            .with_disable_seconds(config.pihole.disable_duration()))
    }

    pub fn with_disable_seconds(mut self, seconds: Option<u64>) -> Self {
        self.disable_seconds = seconds;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Standing notice when Pi-hole control is unavailable.
    pub fn pihole_notice(&self) -> Option<String> {
        self.pihole
            .as_ref()
            .err()
            .map(|reason| format_disabled_feature("Pi-hole control", reason))
    }

    /// Run one input through the whole pipeline.
    pub async fn handle_input(
        &mut self,
        prompt: &str,
        view: &mut dyn TranscriptView,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        match self.reply(prompt, view, cancel).await {
            ControlFlow::Continue(routed_text) => self.act(prompt, &routed_text, view).await,
            ControlFlow::Break(outcome) => outcome,
        }
    }

    /// Record the prompt and stream the reply. `cancel` is only observed here.
    ///
    /// Continues with the text to route on, or breaks with the outcome when
    /// the turn ends without routing.
    pub async fn reply(
        &mut self,
        prompt: &str,
        view: &mut dyn TranscriptView,
        cancel: &CancellationToken,
    ) -> ControlFlow<TurnOutcome, String> {
        let user_turn = Turn::user(prompt);
        view.show_turn(self.transcript.push(user_turn));

        let reply = self.generate(view, cancel).await;

        let (content, outcome) = match reply {
            Reply::Complete(text) => (text, None),
            Reply::Interrupted(text) => (
                format!("{}{}", text.trim_end(), INTERRUPTED_MARKER)
                    .trim_start()
                    .to_string(),
                Some(TurnOutcome::Interrupted),
            ),
            Reply::Failed(text) => (text, Some(TurnOutcome::ModelFailed)),
        };

        view.stream_finished(self.transcript.push(Turn::assistant(content.clone())));

        if let Some(outcome) = outcome {
            return ControlFlow::Break(outcome);
        }

        if self.generator.routes_on_prompt() {
            ControlFlow::Continue(prompt.to_string())
        } else {
            ControlFlow::Continue(content)
        }
    }

    /// Route `routed_text` and append the formatted result, if any. Not
    /// cancellable: collaborator calls run to their own timeouts.
    pub async fn act(
        &mut self,
        prompt: &str,
        routed_text: &str,
        view: &mut dyn TranscriptView,
    ) -> TurnOutcome {
        let decision = self.router.route(routed_text, prompt);
        let tag = decision.tag();
        if tag == ActionTag::Unknown {
            return TurnOutcome::Answered;
        }

        view.begin_activity(activity_label(tag));
        let result = self.dispatch(decision).await;
        view.end_activity();

        view.show_turn(self.transcript.push(Turn::assistant(result)));
        TurnOutcome::Acted(tag)
    }

    async fn generate(&self, view: &mut dyn TranscriptView, cancel: &CancellationToken) -> Reply {
        let mut rx = match self.generator.stream_reply(self.transcript.turns()).await {
            Ok(rx) => rx,
            Err(e) => {
                tracing::warn!("{} reply failed: {:#}", self.generator.name(), e);
                return Reply::Failed(model_error_message(&e));
            }
        };

        let mut buffer = String::new();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reply cancelled after {} bytes", buffer.len());
                    return Reply::Interrupted(buffer);
                }
                fragment = rx.recv() => match fragment {
                    Some(Ok(text)) => {
                        view.stream_fragment(&text);
                        buffer.push_str(&text);
                    }
                    Some(Err(e)) => {
                        tracing::warn!("{} stream failed: {:#}", self.generator.name(), e);
                        let message = model_error_message(&e);
                        return Reply::Failed(if buffer.is_empty() {
                            message
                        } else {
                            format!("{}\n\n{}", buffer.trim_end(), message)
                        });
                    }
                    None => return Reply::Complete(buffer),
                }
            }
        }
    }

    async fn dispatch(&self, decision: RouteDecision) -> String {
        match decision {
            RouteDecision::PiStatus => format_metrics(&self.metrics.collect_system_metrics().await),
            RouteDecision::NetworkStatus => {
                format_network(&self.network.collect_network_status().await)
            }
            RouteDecision::MissingDomain(tag) => format_missing_domain(tag),
            RouteDecision::Unknown => String::new(),
            pihole_action => match &self.pihole {
                Ok(client) => self.dispatch_pihole(client, pihole_action).await,
                Err(reason) => format_disabled_feature("Pi-hole control", reason),
            },
        }
    }

    async fn dispatch_pihole(&self, client: &PiholeClient, decision: RouteDecision) -> String {
        match decision {
            RouteDecision::PiholeStatus => format_status(&client.get_status().await),
            RouteDecision::PiholeEnable => format_toggle(Toggle::Enable, &client.enable().await),
            RouteDecision::PiholeDisable => format_toggle(
                Toggle::Disable,
                &client.disable(self.disable_seconds).await,
            ),
            RouteDecision::PiholeSummary => format_summary(&client.get_summary().await),
            RouteDecision::TopBlockedDomains => {
                format_top_blocked(&client.get_top_blocked_domains().await)
            }
            RouteDecision::BlacklistAdd { domain } => {
                format_blacklist(&client.add_to_blacklist(&domain).await)
            }
            RouteDecision::BlacklistRemove { domain } => {
                format_blacklist(&client.remove_from_blacklist(&domain).await)
            }
            RouteDecision::PiStatus
            | RouteDecision::NetworkStatus
            | RouteDecision::MissingDomain(_)
            | RouteDecision::Unknown => String::new(),
        }
    }
}

fn activity_label(tag: ActionTag) -> &'static str {
    match tag {
        ActionTag::PiStatus => "Collecting system metrics",
        ActionTag::NetworkStatus => "Running network checks",
        ActionTag::BlacklistAdd | ActionTag::BlacklistRemove => "Updating the blacklist",
        _ => "Contacting Pi-hole",
    }
}

fn model_error_message(e: &anyhow::Error) -> String {
    format!("Sorry, I couldn't get a reply from the model: {:#}", e)
}
