use std::time::Duration;

use serde_json::json;

use super::LlmError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama-3.1-8b-instruct";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client with bounded exponential-backoff retry.
///
/// Payloads are deterministic (temperature 0.0, no streaming). Transport
/// errors are retried with `initial_delay * 2^attempt`; HTTP error statuses
/// fail immediately, matching the behavior callers rely on for fast
/// connection diagnostics.
#[derive(Debug, Clone)]
pub struct LlmClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    initial_delay: Duration,
}

impl LlmClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client: reqwest::Client::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }

    pub fn with_retry_policy(mut self, max_retries: u32, initial_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.initial_delay = initial_delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat request and return the first choice's message content.
    /// A null content field is normalized to an empty string.
    pub async fn chat(
        &self,
        system_prompt: Option<&str>,
        user_prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::new();
        if let Some(system) = system_prompt {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": user_prompt}));

        let mut payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.0,
            "stream": false,
        });
        if let Some(max_tokens) = max_tokens {
            payload["max_tokens"] = max_tokens.into();
        }

        let mut attempt: u32 = 0;
        loop {
            let result = self
                .client
                .post(&self.endpoint)
                .json(&payload)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(LlmError::Status(status));
                    }
                    let data: serde_json::Value = response.json().await?;
                    let has_choices = data["choices"]
                        .as_array()
                        .is_some_and(|choices| !choices.is_empty());
                    if !has_choices {
                        return Err(LlmError::NoChoices);
                    }
                    let content = data["choices"][0]["message"]["content"]
                        .as_str()
                        .unwrap_or("")
                        .to_string();
                    return Ok(content);
                }
                Err(error) if attempt + 1 < self.max_retries => {
                    let delay = self.initial_delay * 2u32.pow(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        error = %error,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(LlmError::RetriesExhausted {
                        retries: self.max_retries,
                        source: error,
                    });
                }
            }
        }
    }

    /// Minimal one-token request to verify the server is up and a model is
    /// loaded.
    pub async fn healthcheck(&self) -> Result<(), LlmError> {
        self.chat(None, "hello", Some(1)).await.map(|_| ())
    }
}

impl Default for LlmClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }
}
