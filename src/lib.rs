//! Personal website server: static assets plus a profile chat endpoint.

pub mod chat;
pub mod config;
pub mod profile;
pub mod responder;
pub mod upstream;
pub mod web;

pub use chat::{ChatError, ChatRequest, ChatResponse, ChatService, ReplySource};
pub use config::{EnvSource, ServerArgs, UpstreamConfig};
pub use profile::Profile;
pub use responder::{local_reply, TemplatePicker};
pub use upstream::{CompletionBackend, UpstreamClient, UpstreamError};
pub use web::start_servers;
