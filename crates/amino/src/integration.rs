pub mod http;

use anyhow::Result;
use serde::Deserialize;
use std::fmt::Debug;

use crate::app::App;

use self::http::HttpIntegration;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Config {
    Http(http::Config),
}

/// An outward-facing surface that owns an [`App`] and serves it.
#[async_trait::async_trait]
pub trait Integration: Debug {
    async fn serve(&self, app: App) -> Result<()>;
}

impl TryFrom<Config> for Box<dyn Integration> {
    type Error = anyhow::Error;

    fn try_from(value: Config) -> Result<Self, Self::Error> {
        let integration: Box<dyn Integration> = match value {
            Config::Http(config) => Box::new(HttpIntegration::from(config)),
        };

        Ok(integration)
    }
}
