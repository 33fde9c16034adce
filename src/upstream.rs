// src/upstream.rs
//! Chat-completion client for the configured upstream API

use crate::config::UpstreamConfig;
use crate::profile::Profile;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Returned in place of a reply when the upstream answered with blank content
pub const EMPTY_RESPONSE_NOTICE: &str = "抱歉，收到了空响应。";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("timeout")]
    Timeout,
    #[error("http_status:{0}")]
    HttpStatus(u16),
    #[error("network")]
    Network(String),
    #[error("unparseable")]
    Unparseable,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

impl UpstreamError {
    /// Reason plus any underlying detail, for operator logs only
    pub fn diagnostic(&self) -> String {
        match self {
            UpstreamError::Network(detail) => format!("{}: {}", self, detail),
            other => other.to_string(),
        }
    }
}

/// Anything able to answer a visitor's message on the profile owner's behalf
#[rocket::async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        message: &str,
        config: &UpstreamConfig,
        profile: &Profile,
    ) -> Result<String, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[rocket::async_trait]
impl CompletionBackend for UpstreamClient {
    async fn complete(
        &self,
        message: &str,
        config: &UpstreamConfig,
        profile: &Profile,
    ) -> Result<String, UpstreamError> {
        let instruction = system_instruction(profile);
        let request = CompletionRequest {
            model: &config.model,
            messages: vec![
                CompletionMessage {
                    role: "system",
                    content: &instruction,
                },
                CompletionMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        info!("Calling upstream API: {} (model: {})", config.base_url, config.model);

        let response = self
            .client
            .post(&config.base_url)
            .bearer_auth(&config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Upstream API error {}: {}", status, error_text);
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }

        let response_text = response.text().await?;
        debug!("Raw upstream response: {}", response_text);

        let body: Value = serde_json::from_str(&response_text).map_err(|e| {
            warn!("Upstream response is not JSON ({}): {}", e, response_text);
            UpstreamError::Unparseable
        })?;

        extract_content(&body)
    }
}

type Extractor = for<'a> fn(&'a Value) -> Option<&'a str>;

/// Response shapes accepted from upstream, tried in order
const EXTRACTORS: [(&str, Extractor); 6] = [
    ("choices[0].message.content", choice_message_content),
    ("choices[0].text", choice_text),
    ("choices[0]", choice_string),
    ("data", top_level_data),
    ("result", top_level_result),
    ("response", top_level_response),
];

fn choice_message_content(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")?.as_str()
}

fn choice_text(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/text")?.as_str()
}

fn choice_string(body: &Value) -> Option<&str> {
    body.pointer("/choices/0")?.as_str()
}

fn top_level_data(body: &Value) -> Option<&str> {
    body.get("data")?.as_str()
}

fn top_level_result(body: &Value) -> Option<&str> {
    body.get("result")?.as_str()
}

fn top_level_response(body: &Value) -> Option<&str> {
    body.get("response")?.as_str()
}

/// Pull the reply text out of an upstream body. The first shape carrying
/// non-blank text wins; blank-only matches yield `EMPTY_RESPONSE_NOTICE`.
pub fn extract_content(body: &Value) -> Result<String, UpstreamError> {
    let mut matched_blank = false;

    for (shape, extract) in EXTRACTORS.iter() {
        if let Some(content) = extract(body) {
            let content = content.trim();
            if !content.is_empty() {
                debug!("Upstream reply matched shape {}", shape);
                return Ok(content.to_string());
            }
            matched_blank = true;
        }
    }

    if matched_blank {
        warn!("Upstream returned an empty reply");
        Ok(EMPTY_RESPONSE_NOTICE.to_string())
    } else {
        warn!("Unrecognised upstream response shape: {}", body);
        Err(UpstreamError::Unparseable)
    }
}

/// Persona instruction sent ahead of the visitor's message
pub fn system_instruction(profile: &Profile) -> String {
    let experience = profile
        .experience
        .iter()
        .map(|exp| format!("- {} - {}: {}", exp.company, exp.position, exp.description))
        .collect::<Vec<_>>()
        .join("\n");
    let projects = profile
        .projects
        .iter()
        .map(|project| format!("- {}", project))
        .collect::<Vec<_>>()
        .join("\n");
    let contact = &profile.contact;

    format!(
        r#"你是{name}的AI助手，专门为访问他个人网站的用户提供服务。

关于{name}的信息：
- 姓名：{name}
- 职位：{title}
- 教育背景：{degrees}
- 荣誉：{honors}

工作经历：
{experience}

主要项目：
{projects}

技能专长：
{skills}

联系方式：
- 邮箱：{email}
- 电话：{phone}
- LinkedIn：{linkedin}
- GitHub：{github}

请以友好、专业的语气回答用户问题，重点介绍{name}的专业能力和项目经验。回复应该简洁明了，通常控制在200字以内。"#,
        name = profile.name,
        title = profile.title,
        degrees = profile.degrees_line(),
        honors = profile.honors_line(),
        experience = experience,
        projects = projects,
        skills = profile.skills.join(", "),
        email = contact.email,
        phone = contact.phone,
        linkedin = contact.linkedin,
        github = contact.github,
    )
}
