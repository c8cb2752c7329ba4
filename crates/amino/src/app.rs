use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use log::debug;
use serde::Deserialize;

use crate::{
    assistant::{self, Assistant},
    integration::{self, Integration},
    llm::{self, Llm},
    message::{Message, Role},
    reply::Failure,
};

#[derive(Deserialize, Debug)]
pub struct Config {
    llms: HashMap<String, llm::Config>,
    assistants: HashMap<String, assistant::Config>,
    integrations: HashMap<String, integration::Config>,
}

/// Composition root, built once at process start. Every assistant's
/// knowledge base is read and composed here; everything is immutable
/// afterwards.
#[derive(Debug)]
pub struct App {
    llms: HashMap<String, Arc<Box<dyn Llm>>>,
    assistants: HashMap<String, Assistant>,
    integrations: HashMap<String, integration::Config>,
}

impl TryFrom<Config> for App {
    type Error = anyhow::Error;

    fn try_from(value: Config) -> Result<Self, Self::Error> {
        let mut llms: HashMap<String, Arc<Box<dyn Llm>>> = HashMap::new();
        for (name, config) in value.llms {
            let llm: Box<dyn Llm> = Box::from(config);
            llms.insert(name, Arc::new(llm));
        }

        let mut assistants = HashMap::new();
        for (name, config) in value.assistants {
            assistants.insert(name, Assistant::load(&config)?);
        }

        Ok(Self {
            llms,
            assistants,
            integrations: value.integrations,
        })
    }
}

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("the {0} {1} does not exist in the configuration")]
    ResourceNotFound(&'static str, String),
}

impl App {
    pub fn assistant(&self, name: &str) -> Result<&Assistant> {
        let assistant = self
            .assistants
            .get(name)
            .ok_or(Error::ResourceNotFound("assistant", name.to_string()))?;

        Ok(assistant)
    }

    pub fn llm(&self, name: &str) -> Result<&Arc<Box<dyn Llm>>> {
        let llm = self
            .llms
            .get(name)
            .ok_or(Error::ResourceNotFound("llm", name.to_string()))?;

        Ok(llm)
    }

    pub fn integration(&self, name: &str) -> Result<&integration::Config> {
        let integration = self
            .integrations
            .get(name)
            .ok_or(Error::ResourceNotFound("integration", name.to_string()))?;

        Ok(integration)
    }

    /// Relay one question to the assistant's completion backend. Exactly two
    /// turns go upstream: the composed system prompt and the latest user
    /// message. Earlier turns of the visitor's session are not submitted.
    pub async fn ask(&self, assistant: &str, message: &str) -> Result<String> {
        let assistant = self.assistant(assistant)?;
        let llm = self.llm(assistant.llm())?;

        debug!("relaying message to llm {}", assistant.llm());

        let messages = vec![
            Message::new(Role::System, assistant.system_prompt()),
            Message::new(Role::User, message),
        ];

        let reply = llm.chat(messages).await?;

        // An empty-but-successful completion becomes a canned apology, not
        // an error.
        if reply.is_empty() {
            return Ok(Failure::EmptyCompletion.user_message().to_string());
        }

        Ok(reply)
    }

    pub async fn run_integration(self, name: &str) -> Result<()> {
        let integration = self.integration(name)?;
        let integration: Box<dyn Integration> = Box::try_from(integration.clone())?;
        integration.serve(self).await
    }

    #[cfg(test)]
    pub(crate) fn stub(llm: Box<dyn Llm>) -> Self {
        let mut llms: HashMap<String, Arc<Box<dyn Llm>>> = HashMap::new();
        llms.insert("stub".to_string(), Arc::new(llm));

        let mut assistants = HashMap::new();
        assistants.insert(
            "amino".to_string(),
            Assistant::new("stub", "You answer questions about Mohamed Amine.", "None."),
        );

        Self {
            llms,
            assistants,
            integrations: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug)]
    struct RecordingLlm {
        seen: Arc<Mutex<Vec<Message>>>,
        reply: &'static str,
    }

    #[async_trait::async_trait]
    impl Llm for RecordingLlm {
        async fn chat(&self, messages: Vec<Message>) -> Result<String> {
            *self.seen.lock().unwrap() = messages;
            Ok(self.reply.to_string())
        }
    }

    fn recording_app(reply: &'static str) -> (App, Arc<Mutex<Vec<Message>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let llm = RecordingLlm {
            seen: seen.clone(),
            reply,
        };
        (App::stub(Box::new(llm)), seen)
    }

    #[tokio::test]
    async fn ask_returns_completion_text() {
        let (app, _) = recording_app("He works at Vermeg.");

        let reply = app.ask("amino", "Where does he work?").await.unwrap();
        assert_eq!(reply, "He works at Vermeg.");
    }

    #[tokio::test]
    async fn ask_submits_system_prompt_and_latest_message_only() {
        let (app, seen) = recording_app("ok");

        app.ask("amino", "What are his skills?").await.unwrap();

        let sent = seen.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[0].content.contains("Knowledge Base:"));
        assert_eq!(sent[1].role, Role::User);
        assert_eq!(sent[1].content, "What are his skills?");
    }

    #[tokio::test]
    async fn ask_replaces_empty_completion_with_apology() {
        let (app, _) = recording_app("");

        let reply = app.ask("amino", "anything").await.unwrap();
        assert_eq!(
            reply,
            "I'm sorry, I couldn't generate a response. Please try again."
        );
    }

    #[tokio::test]
    async fn ask_rejects_unknown_assistant() {
        let (app, _) = recording_app("ok");

        let err = app.ask("nobody", "hello").await.unwrap_err();
        assert!(err.to_string().contains("nobody"));
    }
}
