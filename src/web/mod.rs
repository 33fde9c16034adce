// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::chat::ChatService;
use crate::config::ServerArgs;
use anyhow::{Context, Result};
use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::{Header, Status};
use rocket::{catchers, options, post, routes, Build, Request, Response, Rocket, State};
use std::path::Path;
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}

#[post("/api/chat", data = "<body>")]
pub async fn chat(body: Vec<u8>, service: &State<ChatService>) -> JsonResponse {
    handlers::chat_handler(&body, service).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(404)]
pub fn not_found() -> &'static str {
    "API endpoint not found"
}

#[rocket::catch(500)]
pub fn internal_error() -> JsonResponse {
    JsonResponse::error(Status::InternalServerError, "internal server error")
}

#[rocket::catch(default)]
pub fn default_catcher(status: Status, _request: &Request<'_>) -> JsonResponse {
    JsonResponse::error(status, status.reason_lossy())
}

fn listener_figment(args: &ServerArgs, port: u16) -> Figment {
    rocket::Config::figment()
        .merge(("address", args.host))
        .merge(("port", port))
        .merge(("ident", "sitechat"))
        .merge(("log_level", "critical"))
}

/// Rocket instance for the chat API listener
pub fn api_rocket(figment: Figment, service: ChatService) -> Rocket<Build> {
    // `Vec<u8>` bodies are capped by the "bytes" limit, 8 KiB by default
    let figment = figment.merge(("limits", Limits::default().limit("bytes", 1.mebibytes())));

    rocket::custom(figment)
        .attach(Cors)
        .manage(service)
        .register("/", catchers![not_found, internal_error, default_catcher])
        .mount("/", routes![chat, options])
}

/// Rocket instance serving files from `dir`
pub fn static_rocket(figment: Figment, dir: &Path) -> Result<Rocket<Build>> {
    if !dir.is_dir() {
        anyhow::bail!("Static directory not found: {}", dir.display());
    }
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve static directory: {}", dir.display()))?;

    Ok(rocket::custom(figment).mount("/", FileServer::from(dir)))
}

// Main server start function
pub async fn start_servers(args: &ServerArgs, service: ChatService) -> Result<()> {
    if service.upstream_enabled() {
        info!("Upstream API key detected, chat replies use the language model");
    } else {
        info!("No upstream API key configured, chat replies are answered locally");
        info!("Set OPENAI_API_KEY to enable the language model");
    }

    let static_server = static_rocket(listener_figment(args, args.static_port), &args.static_dir)?;
    let api_server = api_rocket(listener_figment(args, args.api_port), service);

    info!("Static files: http://{}:{}", args.host, args.static_port);
    info!("Chat API: http://{}:{}/api/chat", args.host, args.api_port);

    // Both listeners stop on Ctrl-C; whichever ends first ends the process.
    tokio::select! {
        result = static_server.launch() => {
            result.map_err(|e| anyhow::anyhow!("Static asset server stopped: {}", e))?;
        }
        result = api_server.launch() => {
            result.map_err(|e| anyhow::anyhow!("Chat API server stopped: {}", e))?;
        }
    }

    info!("Servers shut down");
    Ok(())
}
