use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::App;

use super::Integration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Name of the assistant every chat request is relayed to.
    pub assistant: String,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug)]
pub struct HttpIntegration {
    config: Config,
}

impl From<Config> for HttpIntegration {
    fn from(value: Config) -> Self {
        Self { config: value }
    }
}

#[derive(Debug)]
struct Server {
    app: App,
    assistant: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContactRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

async fn chat(
    State(server): State<Arc<Server>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to generate response" })),
        );
    };

    let message = match request.message {
        Some(message) if !message.is_empty() => message,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Message is required" })),
            )
        }
    };

    match server.app.ask(&server.assistant, &message).await {
        Ok(response) => (StatusCode::OK, Json(json!({ "response": response }))),
        Err(err) => {
            // Full detail stays in the log; the client only ever sees the
            // generic body.
            error!("completion API error: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate response" })),
            )
        }
    }
}

async fn contact(
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to process your message" })),
        );
    };

    let (Some(name), Some(email), Some(message)) =
        (request.name, request.email, request.message)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "All fields are required" })),
        );
    };

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "All fields are required" })),
        );
    }

    // Placeholder integration point: submissions are logged, not delivered.
    info!("contact form submission from {name} <{email}>: {message}");

    (
        StatusCode::OK,
        Json(json!({
            "message": "Message received successfully. We will get back to you soon!"
        })),
    )
}

#[async_trait::async_trait]
impl Integration for HttpIntegration {
    async fn serve(&self, app: App) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port.unwrap_or(8080)));
        let server = Arc::new(Server {
            app,
            assistant: self.config.assistant.clone(),
        });

        let router = Router::new()
            .route("/api/chat", post(chat))
            .route("/api/contact", post(contact))
            .with_state(server);

        info!("listening on {addr}");

        axum::Server::bind(&addr)
            .serve(router.into_make_service())
            .await?;

        Ok(())
    }
}
