use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

/// One round trip to the chat relay endpoint.
#[async_trait::async_trait]
pub trait Relay: Send + Sync {
    async fn send(&self, message: &str) -> Result<String>;
}

/// Relay client for a served HTTP integration.
pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
}

impl HttpRelay {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/chat", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait::async_trait]
impl Relay for HttpRelay {
    async fn send(&self, message: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "message": message }))
            .send()
            .await
            .context("relay request failed")?;

        let status = resp.status();
        let body: Value = resp.json().await.context("relay response is not JSON")?;

        if !status.is_success() {
            let detail = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error");
            bail!("relay error ({status}): {detail}");
        }

        body.get("response")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .context("relay response has no response field")
    }
}
