// src/chat.rs
//! Handling of `POST /api/chat`: validation, local-vs-upstream decision
//! and fallback.

use crate::config::{EnvSource, UpstreamConfig};
use crate::profile::Profile;
use crate::responder::{local_reply, TemplatePicker};
use crate::upstream::CompletionBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Local,
    Upstream,
    UpstreamFallback,
}

impl ReplySource {
    fn status_message(self) -> &'static str {
        match self {
            ReplySource::Local => "Local reply (no upstream API key configured)",
            ReplySource::Upstream => "Reply from the upstream language model",
            ReplySource::UpstreamFallback => "Upstream call failed, using local reply",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: ReplySource,
    pub message: String,
}

impl ChatResponse {
    fn new(response: String, source: ReplySource) -> Self {
        Self {
            response,
            source,
            message: source.status_message().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("internal server error")]
    Internal(String),
}

impl ChatError {
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::InvalidJson(_) | ChatError::EmptyMessage => 400,
            ChatError::Internal(_) => 500,
        }
    }
}

/// Everything a chat request needs; built once at startup.
pub struct ChatService {
    profile: Profile,
    backend: Arc<dyn CompletionBackend>,
    picker: TemplatePicker,
    env: EnvSource,
}

impl ChatService {
    pub fn new(
        profile: Profile,
        backend: Arc<dyn CompletionBackend>,
        picker: TemplatePicker,
        env: EnvSource,
    ) -> Self {
        Self {
            profile,
            backend,
            picker,
            env,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Whether requests would currently go upstream
    pub fn upstream_enabled(&self) -> bool {
        UpstreamConfig::load(&self.env).is_some()
    }

    /// Handle a raw request body.
    pub async fn handle(&self, body: &[u8]) -> Result<ChatResponse, ChatError> {
        let request: ChatRequest = serde_json::from_slice(body).map_err(|e| {
            warn!("Rejecting chat request with invalid JSON: {}", e);
            ChatError::InvalidJson(e)
        })?;

        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let Some(config) = UpstreamConfig::load(&self.env) else {
            return self.reply_locally(message, ReplySource::Local);
        };

        match self.backend.complete(message, &config, &self.profile).await {
            Ok(reply) => Ok(ChatResponse::new(reply, ReplySource::Upstream)),
            Err(e) => {
                warn!("Upstream call failed ({}), falling back to local reply", e.diagnostic());
                self.reply_locally(message, ReplySource::UpstreamFallback)
            }
        }
    }

    fn reply_locally(&self, message: &str, source: ReplySource) -> Result<ChatResponse, ChatError> {
        match local_reply(message, &self.profile, &self.picker) {
            Ok(reply) => {
                info!("Answered locally ({:?})", source);
                Ok(ChatResponse::new(reply, source))
            }
            Err(e) => {
                error!("Local reply failed: {}", e);
                Err(ChatError::Internal(e.to_string()))
            }
        }
    }
}
