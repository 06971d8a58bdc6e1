// Demo responder - canned replies, no network
//
// Picks a reply with the same keyword table the router uses, so the
// structured result that follows always matches the canned text.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ReplyGenerator;
use crate::cli::{Role, Turn};
use crate::router::{ActionTag, Router};

pub struct DemoResponder {
    router: Router,
}

impl DemoResponder {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Canned reply for a prompt.
    pub fn reply_for(&self, prompt: &str) -> &'static str {
        canned_reply(self.router.classify(prompt))
    }
}

impl Default for DemoResponder {
    fn default() -> Self {
        Self::new(Router::default())
    }
}

fn canned_reply(tag: ActionTag) -> &'static str {
    match tag {
        ActionTag::PiStatus => "Reading the Raspberry Pi's vitals now.",
        ActionTag::NetworkStatus => {
            "Running a speed test and checking addresses. This can take a few seconds."
        }
        ActionTag::PiholeStatus => "Asking the Pi-hole whether ad blocking is active.",
        ActionTag::PiholeEnable => "Turning Pi-hole ad blocking on.",
        ActionTag::PiholeDisable => "Pausing Pi-hole ad blocking.",
        ActionTag::PiholeSummary => "Fetching today's Pi-hole numbers.",
        ActionTag::TopBlockedDomains => "Looking up the most blocked domains.",
        ActionTag::BlacklistAdd => "Adding that domain to the Pi-hole blacklist.",
        ActionTag::BlacklistRemove => "Removing that domain from the Pi-hole blacklist.",
        ActionTag::Unknown => {
            "I'm running in demo mode. Try 'pi status', 'network status', \
             'pi-hole status', 'pi-hole summary', 'top blocked domains' or \
             'blacklist domain add example.com'."
        }
    }
}

#[async_trait]
impl ReplyGenerator for DemoResponder {
    async fn stream_reply(&self, transcript: &[Turn]) -> Result<mpsc::Receiver<Result<String>>> {
        let prompt = transcript
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
            .unwrap_or_default();

        let fragments: Vec<String> = self
            .reply_for(prompt)
            .split_inclusive(' ')
            .map(str::to_string)
            .collect();

        let (tx, rx) = mpsc::channel(fragments.len().max(1));
        for fragment in fragments {
            let _ = tx.try_send(Ok(fragment));
        }
        Ok(rx)
    }

    fn name(&self) -> &str {
        "demo"
    }

    fn routes_on_prompt(&self) -> bool {
        true
    }
}
