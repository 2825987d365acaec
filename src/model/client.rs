//! OpenAI-compatible Chat Completions client for a locally hosted model.
//!
//! Local inference servers (Foundry Local, Ollama, LM Studio) all expose
//! `POST {base_url}/chat/completions`. Requests are retried with exponential
//! backoff on network errors and 5xx responses.

use super::{ChatModel, StreamEvent};
use crate::message::Message;
use crate::{Result, TutorError};
use futures::StreamExt;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const MAX_RETRY_ATTEMPTS: u32 = 4;
const RETRY_BASE_DELAY_MS: u64 = 200;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const ERROR_DETAIL_MAX_CHARS: usize = 500;

/// Connection and sampling settings for [`ChatClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// `None` waits as long as the server takes
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

fn think_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think regex"))
}

/// HTTP client for one model on one endpoint
pub struct ChatClient {
    client: Client,
    options: ClientOptions,
}

impl ChatClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("django-girls-offline/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TutorError::Config(format!("HTTP client: {e}")))?;

        info!(
            "Chat client: model={}, base_url={}, timeout={:?}",
            options.model, options.base_url, options.request_timeout
        );

        Ok(Self { client, options })
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.options.base_url.trim_end_matches('/'))
    }

    fn post(&self, request: &ChatRequest<'_>) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json");
        if let Some(key) = &self.options.api_key {
            builder = builder.bearer_auth(key);
        }
        builder.json(request)
    }

    /// Remove `<think>…</think>` reasoning that local reasoning models emit
    pub fn strip_think_tags(content: &str) -> String {
        if let Some(m) = think_regex().find(content) {
            debug!("Model thinking: {}", m.as_str());
        }
        let stripped = think_regex().replace_all(content, "");
        // An unterminated block means the reply was all reasoning
        match stripped.find("<think>") {
            Some(pos) => stripped[..pos].trim().to_string(),
            None => stripped.trim().to_string(),
        }
    }

    /// Compute exponential backoff with a little deterministic jitter
    fn retry_backoff(attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base_ms = RETRY_BASE_DELAY_MS.saturating_mul(exp);
        let jitter = 1.0 + ((attempt as f64 * 0.37).sin() * 0.1);
        Duration::from_millis((base_ms as f64 * jitter) as u64)
    }

    /// Only failures classified by `map_reqwest_error` or
    /// `check_response_status` as transient are retried.
    fn is_retryable_error(err: &TutorError) -> bool {
        const RETRYABLE_PREFIXES: [&str; 3] = ["timeout:", "network:", "retryable API error"];
        match err {
            TutorError::Completion(msg) => RETRYABLE_PREFIXES.iter().any(|p| msg.starts_with(p)),
            _ => false,
        }
    }

    async fn send_completion(&self, history: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.options.model,
            messages: history,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            stream: false,
        };

        let response = self
            .post(&request)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;
        let response = Self::check_response_status(response).await?;

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| TutorError::Completion(format!("unusable response body: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TutorError::Completion("response contained no message".to_string()))
    }

    async fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = Self::truncate_error_detail(&Self::extract_error_detail(&body), ERROR_DETAIL_MAX_CHARS);
        let prefix = if status.is_server_error() {
            "retryable API error"
        } else {
            "API error"
        };
        if detail.is_empty() {
            Err(TutorError::Completion(format!("{prefix} {status}")))
        } else {
            Err(TutorError::Completion(format!("{prefix} {status}: {detail}")))
        }
    }

    fn extract_error_detail(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            if let Some(msg) = value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                return msg.to_string();
            }
            if let Some(msg) = value.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }

        trimmed.to_string()
    }

    fn truncate_error_detail(detail: &str, max_chars: usize) -> String {
        if detail.chars().count() <= max_chars {
            return detail.to_string();
        }

        let mut truncated = detail.chars().take(max_chars).collect::<String>();
        truncated.push_str("... [truncated]");
        truncated
    }

    fn map_reqwest_error(e: reqwest::Error) -> TutorError {
        if e.is_timeout() {
            TutorError::Completion(format!("timeout: {e}"))
        } else if e.is_connect() || e.is_request() {
            TutorError::Completion(format!("network: {e}"))
        } else {
            TutorError::Completion(e.to_string())
        }
    }
}

impl ChatModel for ChatClient {
    /// Complete with retry (max 4 attempts, exponential backoff)
    async fn complete(&self, history: &[Message]) -> Result<String> {
        debug!("Requesting completion for {} messages", history.len());

        let mut last_err = None;
        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let delay = Self::retry_backoff(attempt);
                warn!(
                    "Completion failed (attempt {}/{}), retrying in {:?}...",
                    attempt, MAX_RETRY_ATTEMPTS, delay
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_completion(history).await {
                Ok(content) => {
                    let reply = Self::strip_think_tags(&content);
                    debug!("Model reply: {}", reply);
                    return Ok(reply);
                }
                Err(e) => {
                    if Self::is_retryable_error(&e) && attempt + 1 < MAX_RETRY_ATTEMPTS {
                        last_err = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            TutorError::Completion("all retry attempts exhausted".to_string())
        }))
    }

    /// Stream a completion. Fragments arrive on the returned channel,
    /// terminated by `Done` or `Error`.
    async fn stream(&self, history: &[Message]) -> Result<mpsc::Receiver<StreamEvent>> {
        let request = ChatRequest {
            model: &self.options.model,
            messages: history,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            stream: true,
        };

        debug!("Streaming completion for {} messages", history.len());
        let response = self
            .post(&request)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;
        let response = Self::check_response_status(response).await?;

        let (tx, rx) = mpsc::channel(32);
        let mut stream = response.bytes_stream();
        tokio::spawn(async move {
            let mut parser = SseLineBuffer::default();

            while let Some(chunk_result) = stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                for event in parser.push(&bytes) {
                    let finished = event == StreamEvent::Done;
                    if tx.send(event).await.is_err() || finished {
                        return;
                    }
                }
            }
            let _ = tx.send(StreamEvent::Done).await;
        });

        Ok(rx)
    }
}

/// Splits a server-sent event byte stream into completion events.
///
/// Lines (and the characters in them) may be split across network chunks,
/// so raw bytes are held until their newline arrives and only whole lines
/// are decoded.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let Some(data) = line.trim_end().strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data == "[DONE]" {
                events.push(StreamEvent::Done);
                return events;
            }

            match serde_json::from_str::<StreamChunk>(data) {
                Ok(chunk) => {
                    let Some(choice) = chunk.choices.into_iter().next() else {
                        continue;
                    };
                    if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                        events.push(StreamEvent::Delta(content));
                    }
                    if choice.finish_reason.is_some() {
                        events.push(StreamEvent::Done);
                        return events;
                    }
                }
                Err(e) => debug!("Skipping unparseable stream chunk ({}): {}", e, data),
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_think_tags() {
        assert_eq!(
            ChatClient::strip_think_tags("<think>user greets me</think>\n```python\ntutorial.show('welcome')\n```"),
            "```python\ntutorial.show('welcome')\n```"
        );
        assert_eq!(ChatClient::strip_think_tags("  plain reply "), "plain reply");
        assert_eq!(ChatClient::strip_think_tags("<think>still going"), "");
    }

    #[test]
    fn test_extract_error_detail() {
        assert_eq!(
            ChatClient::extract_error_detail(r#"{"error": {"message": "model not loaded"}}"#),
            "model not loaded"
        );
        assert_eq!(ChatClient::extract_error_detail(r#"{"message": "busy"}"#), "busy");
        assert_eq!(ChatClient::extract_error_detail("  Bad Gateway "), "Bad Gateway");
    }

    #[test]
    fn test_truncate_error_detail() {
        let long = "x".repeat(600);
        let truncated = ChatClient::truncate_error_detail(&long, 500);
        assert!(truncated.ends_with("... [truncated]"));
        assert_eq!(truncated.chars().count(), 500 + "... [truncated]".len());
    }

    #[test]
    fn test_retry_backoff_grows() {
        let first = ChatClient::retry_backoff(1);
        let second = ChatClient::retry_backoff(2);
        let third = ChatClient::retry_backoff(3);
        assert!(first < second && second < third);
    }

    #[test]
    fn test_retryable_errors() {
        let completion = |msg: &str| TutorError::Completion(msg.to_string());
        assert!(ChatClient::is_retryable_error(&completion("network: connection refused")));
        assert!(ChatClient::is_retryable_error(&completion("timeout: operation timed out")));
        assert!(ChatClient::is_retryable_error(&completion(
            "retryable API error 503 Service Unavailable"
        )));
        assert!(!ChatClient::is_retryable_error(&completion(
            "API error 404 Not Found: no such model"
        )));
        assert!(!ChatClient::is_retryable_error(&TutorError::Config(
            "timeout".to_string()
        )));
    }

    #[test]
    fn test_client_errors_mentioning_transient_words_are_not_retried() {
        let err = TutorError::Completion(
            "API error 400 Bad Request: connection pool timeout setting is invalid".to_string(),
        );
        assert!(!ChatClient::is_retryable_error(&err));
    }

    #[test]
    fn test_sse_buffer_joins_split_lines() {
        let mut buffer = SseLineBuffer::default();
        let first = buffer.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"del");
        assert_eq!(first, vec![StreamEvent::Delta("Hel".to_string())]);

        let second = buffer.push(b"ta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n\ndata: [DONE]\n\n");
        assert_eq!(
            second,
            vec![StreamEvent::Delta("lo".to_string()), StreamEvent::Done]
        );
    }

    #[test]
    fn test_sse_buffer_keeps_characters_split_across_chunks() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo 🎉\"}}]}\n".as_bytes();
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(&line[..split]).is_empty());
        assert_eq!(
            buffer.push(&line[split..]),
            vec![StreamEvent::Delta("héllo 🎉".to_string())]
        );
    }

    #[test]
    fn test_sse_buffer_finish_reason_ends_stream() {
        let mut buffer = SseLineBuffer::default();
        let events = buffer.push(b"data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n");
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn test_client_builds_without_timeout() {
        let client = ChatClient::new(ClientOptions {
            base_url: "http://localhost:5273/v1/".to_string(),
            model: "Phi-4-generic-gpu".to_string(),
            api_key: None,
            temperature: 0.1,
            max_tokens: 2048,
            request_timeout: None,
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:5273/v1/chat/completions");
        assert_eq!(client.model(), "Phi-4-generic-gpu");
    }
}
