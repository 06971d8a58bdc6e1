// Google Gemini reply generator
//
// Streams replies from `streamGenerateContent` (SSE) or, with streaming
// turned off, returns the whole `generateContent` reply as one fragment.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

use super::retry::{with_retry, RetryPolicy};
use super::ReplyGenerator;
use crate::cli::{Role, Turn};
use crate::config::constants::GEMINI_BASE_URL;
use crate::config::ModelConfig;

/// Asks the model to echo the action phrases the router listens for.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are Pi-Eye, an assistant that watches over a Raspberry Pi, its network link \
and a Pi-hole ad blocker. When the user asks for one of the checks below, answer \
in one or two sentences and include the matching phrase exactly as written: \
'pi status', 'network status', 'pi-hole status', 'enable pi-hole', \
'disable pi-hole', 'pi-hole summary', 'top blocked domains', \
'blacklist domain add <domain>', 'blacklist domain remove <domain>'. \
The live result is appended after your reply, so never invent numbers. \
For anything else, answer normally without using those phrases.";

const STREAM_CHANNEL_CAPACITY: usize = 100;

#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    system_instruction: String,
    generation_config: GeminiGenerationConfig,
    streaming: bool,
    retry: RetryPolicy,
}

impl GeminiGenerator {
    pub fn new(config: &ModelConfig, streaming: bool) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .context("No Gemini API key configured (set GEMINI_API_KEY or [model].api_key)")?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            system_instruction: config
                .system_instruction
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            generation_config: GeminiGenerationConfig {
                temperature: Some(config.temperature),
                top_p: Some(config.top_p),
                top_k: Some(config.top_k),
                max_output_tokens: Some(config.max_output_tokens),
            },
            streaming,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, transcript: &[Turn]) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: self.system_instruction.clone(),
                }],
            },
            contents: to_contents(transcript),
            generation_config: self.generation_config.clone(),
        }
    }

    async fn post(&self, method: &str, body: &GeminiRequest) -> Result<reqwest::Response> {
        let url = format!("{}/models/{}:{}", self.base_url, self.model, method);
        let url = if method == "streamGenerateContent" {
            format!("{}?alt=sse", url)
        } else {
            url
        };

        tracing::debug!("Sending {} request to Gemini ({})", method, self.model);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Gemini API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        Ok(response)
    }

    async fn generate_once(&self, body: &GeminiRequest) -> Result<String> {
        let response: GeminiResponse = self
            .post("generateContent", body)
            .await?
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let (text, _) = response.into_text()?;
        if text.is_empty() {
            anyhow::bail!("Gemini returned an empty reply");
        }
        Ok(text)
    }

    async fn stream_once(&self, body: &GeminiRequest) -> Result<mpsc::Receiver<Result<String>>> {
        let response = self.post("streamGenerateContent", body).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            tracing::debug!("[STREAM] Gemini streaming task started");
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            'read: while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!("Stream error: {}", e);
                        let _ = tx.send(Err(anyhow::Error::new(e.without_url()))).await;
                        break;
                    }
                };
                buffer.extend_from_slice(&bytes);

                while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes);

                    let Some(payload) = sse_payload(&line) else {
                        continue;
                    };
                    if payload == "[DONE]" {
                        break 'read;
                    }

                    let parsed = serde_json::from_str::<GeminiResponse>(payload)
                        .context("Failed to parse Gemini stream event")
                        .and_then(GeminiResponse::into_text);

                    match parsed {
                        Ok((text, finished)) => {
                            // Receiver gone means the turn was cancelled
                            if !text.is_empty() && tx.send(Ok(text)).await.is_err() {
                                break 'read;
                            }
                            if finished {
                                tracing::debug!("[STREAM] Stream completed");
                                break 'read;
                            }
                        }
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            break 'read;
                        }
                    }
                }
            }

            tracing::debug!("[STREAM] Gemini streaming task finished");
        });

        Ok(rx)
    }
}

#[async_trait]
impl ReplyGenerator for GeminiGenerator {
    async fn stream_reply(&self, transcript: &[Turn]) -> Result<mpsc::Receiver<Result<String>>> {
        let body = self.build_request(transcript);

        if self.streaming {
            return with_retry(self.retry, || self.stream_once(&body)).await;
        }

        let text = with_retry(self.retry, || self.generate_once(&body)).await?;
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(Ok(text)).await;
        Ok(rx)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Map transcript turns to Gemini contents, merging consecutive turns of the
/// same role (a routed result follows the model's own reply).
fn to_contents(turns: &[Turn]) -> Vec<GeminiContent> {
    let mut contents: Vec<GeminiContent> = Vec::new();

    for turn in turns.iter().filter(|t| !t.content.trim().is_empty()) {
        // Gemini uses "model" instead of "assistant"
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        let part = GeminiPart {
            text: turn.content.clone(),
        };

        match contents.last_mut() {
            Some(last) if last.role.as_deref() == Some(role) => last.parts.push(part),
            _ => contents.push(GeminiContent {
                role: Some(role.to_string()),
                parts: vec![part],
            }),
        }
    }

    contents
}

/// JSON payload of an SSE `data:` line.
fn sse_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:")
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

// Gemini API types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    error: Option<GeminiApiError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    message: String,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate and whether it finished.
    fn into_text(self) -> Result<(String, bool)> {
        if let Some(error) = self.error {
            anyhow::bail!("Gemini API error: {}", error.message);
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                anyhow::bail!("Gemini blocked the prompt: {}", reason);
            }
            return Ok((String::new(), false));
        };

        let text = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        Ok((text, candidate.finish_reason.is_some()))
    }
}
