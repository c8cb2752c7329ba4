use std::fs;
use std::path::{Path, PathBuf};

use amino::app::{App, Config};
use amino::relay::HttpRelay;
use amino::render;
use amino::widget::{ChatWidget, Outcome, SubmitError, QUICK_QUESTIONS};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Portfolio assistant relay and chat widget")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "amino.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask an assistant a single question through the relay core.
    Ask { assistant: String, message: String },
    /// Serve a configured integration (the HTTP relay endpoints).
    Serve { integration: String },
    /// Drive the chat widget interactively against a running relay.
    Chat {
        /// Base URL of the relay server.
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,
        /// Write the rendered HTML transcript here on exit.
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Ask { assistant, message } => {
            let app = load_app(&cli.config)?;
            let answer = app.ask(&assistant, &message).await?;
            println!("{answer}");
            Ok(())
        }
        Command::Serve { integration } => {
            let app = load_app(&cli.config)?;
            app.run_integration(&integration).await
        }
        Command::Chat { url, transcript } => chat(&url, transcript.as_deref()).await,
    }
}

fn load_app(path: &Path) -> Result<App> {
    let config = fs::read_to_string(path)
        .with_context(|| format!("cannot read configuration {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&config)?;
    App::try_from(config)
}

async fn chat(url: &str, transcript: Option<&Path>) -> Result<()> {
    let mut widget = ChatWidget::new(HttpRelay::new(url));

    // Abandon any in-flight call when the user interrupts.
    let cancel = widget.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    println!("AI Amino> {}\n", widget.messages()[0].content);
    println!("Commands: /q <1-{}> quick question, /reset, /quit\n", QUICK_QUESTIONS.len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();

        match line.as_str() {
            "/quit" => break,
            "/reset" => {
                widget.reset();
                println!("AI Amino> {}\n", widget.messages()[0].content);
                continue;
            }
            "" => continue,
            _ => {}
        }

        let text = match line.strip_prefix("/q") {
            Some(n) => {
                let question = n
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|n| QUICK_QUESTIONS.get(n));
                match question {
                    Some(q) => {
                        println!("you> {q}");
                        (*q).to_string()
                    }
                    None => {
                        println!("usage: /q <1-{}>", QUICK_QUESTIONS.len());
                        continue;
                    }
                }
            }
            None => line,
        };

        println!("AI Amino is typing...");
        match widget.submit(&text).await {
            Ok(Outcome::Answered) | Ok(Outcome::Fallback) => {
                if let Some(reply) = widget.messages().last() {
                    println!("\nAI Amino> {}\n", reply.content);
                }
            }
            Ok(Outcome::Cancelled) => break,
            Err(SubmitError::Empty) => continue,
            Err(SubmitError::Busy) => {
                println!("still waiting on the previous question");
            }
        }
    }

    if let Some(path) = transcript {
        fs::write(path, render::render_transcript(widget.messages()))
            .with_context(|| format!("cannot write transcript {}", path.display()))?;
        println!("transcript written to {}", path.display());
    }

    Ok(())
}
