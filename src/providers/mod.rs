// Reply generators
//
// The shell asks a generator for a stream of text fragments given the
// transcript. The Gemini generator calls the generative API; the demo
// responder answers from a canned table and has the shell route on the
// user's prompt instead of the reply.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

mod demo;
mod gemini;
mod retry;

pub use demo::DemoResponder;
pub use gemini::{GeminiGenerator, DEFAULT_SYSTEM_INSTRUCTION};
pub use retry::{with_retry, RetryPolicy};

use crate::cli::Turn;
use crate::config::{Config, ModelProvider};
use crate::router::Router;

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Start a reply to the transcript's latest prompt.
    ///
    /// Fragments arrive in order; the channel closes when the reply is
    /// complete. Dropping the receiver stops generation.
    async fn stream_reply(&self, transcript: &[Turn]) -> Result<Receiver<Result<String>>>;

    /// Short name for logs and the banner ("gemini", "demo").
    fn name(&self) -> &str;

    /// Route on the user's prompt rather than the generated reply.
    fn routes_on_prompt(&self) -> bool {
        false
    }
}

/// Build the generator selected by configuration, or the demo responder when
/// `force_demo` is set.
pub fn create_generator(config: &Config, force_demo: bool) -> Result<Box<dyn ReplyGenerator>> {
    if force_demo || config.model.provider == ModelProvider::Demo {
        let router = config.keyword_table().map(Router::new).unwrap_or_default();
        return Ok(Box::new(DemoResponder::new(router)));
    }

    let generator = GeminiGenerator::new(&config.model, config.features.streaming_enabled)?;
    Ok(Box::new(generator))
}
