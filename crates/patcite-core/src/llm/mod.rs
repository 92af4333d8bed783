//! Client for an OpenAI-compatible local LLM server (LM Studio and friends),
//! with the prompt/schema layer for the three extraction operations and
//! robust JSON recovery from noisy model output.

mod client;
mod extract;
mod json;
mod schema;

pub use client::{
    DEFAULT_ENDPOINT, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, LlmClient,
};
pub use json::{clean_llm_response, robust_json_extract};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM server returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("LLM request failed after {retries} attempts: {source}")]
    RetriesExhausted {
        retries: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("no completion choices in LLM response")]
    NoChoices,
    #[error("malformed JSON in LLM output: {0}")]
    MalformedJson(String),
}
