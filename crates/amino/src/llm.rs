use anyhow::Result;
use serde::Deserialize;
use std::fmt::Debug;

use crate::message::Message;

use self::openai::OpenAi;

pub mod openai;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Config {
    #[serde(rename = "openai")]
    OpenAi(openai::Config),
}

/// Seam over the external completion service: a list of turns in, the
/// generated text out.
#[async_trait::async_trait]
pub trait Llm: Send + Sync + Debug {
    async fn chat(&self, messages: Vec<Message>) -> Result<String>;
}

impl From<Config> for Box<dyn Llm> {
    fn from(value: Config) -> Self {
        match value {
            Config::OpenAi(config) => Box::new(OpenAi::from(config)),
        }
    }
}
