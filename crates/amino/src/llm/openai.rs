use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::message::Message;

use super::Llm;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub model: String,
    /// Name of the environment variable holding the credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

pub struct OpenAi {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi").field("model", &self.model).finish()
    }
}

impl From<Config> for OpenAi {
    fn from(value: Config) -> Self {
        // An absent credential is not validated here; the request is sent
        // anyway and surfaces through the normal upstream error path.
        let api_key = std::env::var(&value.api_key_env).unwrap_or_default();

        Self {
            client: Client::new(),
            api_key,
            base_url: value
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: value.model,
            max_tokens: value.max_tokens,
            temperature: value.temperature,
        }
    }
}

#[async_trait::async_trait]
impl Llm for OpenAi {
    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
            }))
            .send()
            .await
            .context("completion request failed")?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("completion response is not JSON")?;

        if !status.is_success() {
            let detail = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error from API");
            bail!("completion API error ({status}): {detail}");
        }

        // A successful response with no content is the caller's concern,
        // not an error.
        Ok(body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string())
    }
}
