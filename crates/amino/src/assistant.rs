use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub llm: String,
    pub prompt: String,
    pub knowledge_file: PathBuf,
}

/// An assistant persona: directive text plus the knowledge base it answers
/// from, composed into one immutable system prompt when the app is built.
#[derive(Debug, Clone)]
pub struct Assistant {
    llm: String,
    system_prompt: String,
}

impl Assistant {
    pub fn load(config: &Config) -> Result<Self> {
        let knowledge = fs::read_to_string(&config.knowledge_file).with_context(|| {
            format!(
                "cannot read knowledge file {}",
                config.knowledge_file.display()
            )
        })?;

        Ok(Self::new(&config.llm, &config.prompt, &knowledge))
    }

    pub fn new(llm: &str, prompt: &str, knowledge: &str) -> Self {
        Self {
            llm: llm.to_string(),
            system_prompt: format!("{prompt}\n\nKnowledge Base:\n{knowledge}"),
        }
    }

    pub fn llm(&self) -> &str {
        &self.llm
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn composes_prompt_and_knowledge() {
        let assistant = Assistant::new("openai", "Be accurate.", "Email: a@b.c");

        assert_eq!(
            assistant.system_prompt(),
            "Be accurate.\n\nKnowledge Base:\nEmail: a@b.c"
        );
        assert_eq!(assistant.llm(), "openai");
    }

    #[test]
    fn loads_knowledge_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Location: Tunis, Tunisia").unwrap();

        let config = Config {
            llm: "openai".to_string(),
            prompt: "Answer from the knowledge base.".to_string(),
            knowledge_file: file.path().to_path_buf(),
        };

        let assistant = Assistant::load(&config).unwrap();
        assert!(assistant.system_prompt().contains("Location: Tunis, Tunisia"));
    }

    #[test]
    fn missing_knowledge_file_fails_with_context() {
        let config = Config {
            llm: "openai".to_string(),
            prompt: "irrelevant".to_string(),
            knowledge_file: PathBuf::from("/nonexistent/knowledge.md"),
        };

        let err = Assistant::load(&config).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/knowledge.md"));
    }
}
