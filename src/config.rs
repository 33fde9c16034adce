// src/config.rs
use clap::Parser;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const MAX_TOKENS_VAR: &str = "OPENAI_MAX_TOKENS";
pub const TEMPERATURE_VAR: &str = "OPENAI_TEMPERATURE";

/// Marker value shipped in sample env files; means "not configured"
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_BASE: &str = "https://turingai.plus/v1/chat/completions";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Parser, Debug, Clone)]
#[command(name = "sitechat")]
#[command(about = "Personal website server with a profile chat endpoint")]
pub struct ServerArgs {
    /// Address both listeners bind to
    #[arg(long, env = "SITECHAT_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, env = "STATIC_PORT", default_value_t = 8000)]
    pub static_port: u16,

    #[arg(long, env = "API_PORT", default_value_t = 8001)]
    pub api_port: u16,

    /// Directory served by the static listener
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// YAML profile overriding the built-in biography
    #[arg(long, env = "SITECHAT_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Also write JSON logs to this file (truncated on startup)
    #[arg(long, env = "SITECHAT_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Where upstream settings are read from. The process environment in
/// production, a fixed map in tests.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    pub fn fixed<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn var(&self, key: &str) -> Option<String> {
        match self {
            Self::Process => std::env::var(key).ok(),
            Self::Fixed(vars) => vars.get(key).cloned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl UpstreamConfig {
    /// Read the upstream settings. Returns `None` when there is no usable key.
    pub fn load(env: &EnvSource) -> Option<Self> {
        let api_key = env.var(API_KEY_VAR).filter(|key| is_usable_api_key(key))?;

        Some(Self {
            api_key: api_key.trim().to_string(),
            model: non_empty(env.var(MODEL_VAR)).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty(env.var(API_BASE_VAR))
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            max_tokens: parse_or_default(env, MAX_TOKENS_VAR, DEFAULT_MAX_TOKENS),
            temperature: parse_or_default(env, TEMPERATURE_VAR, DEFAULT_TEMPERATURE),
        })
    }
}

pub fn is_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T: FromStr + Copy + std::fmt::Display>(
    env: &EnvSource,
    key: &str,
    default: T,
) -> T {
    match non_empty(env.var(key)) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_api_key() {
        assert!(is_usable_api_key("sk-123"));
        assert!(!is_usable_api_key(""));
        assert!(!is_usable_api_key("   "));
        assert!(!is_usable_api_key("your_api_key_here"));
    }

    #[test]
    fn test_no_key_means_no_upstream() {
        assert!(UpstreamConfig::load(&EnvSource::Fixed(HashMap::new())).is_none());
        let env = EnvSource::fixed([(API_KEY_VAR, PLACEHOLDER_API_KEY)]);
        assert!(UpstreamConfig::load(&env).is_none());
    }

    #[test]
    fn test_defaults_apply() {
        let env = EnvSource::fixed([(API_KEY_VAR, "sk-test")]);
        let config = UpstreamConfig::load(&env).unwrap();
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides_and_invalid_numbers() {
        let env = EnvSource::fixed([
            (API_KEY_VAR, "sk-test"),
            (MODEL_VAR, "gpt-4o"),
            (API_BASE_VAR, "http://localhost:9000/v1/chat/completions"),
            (MAX_TOKENS_VAR, "abc"),
            (TEMPERATURE_VAR, "0.2"),
        ]);
        let config = UpstreamConfig::load(&env).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_server_args_defaults() {
        let args = ServerArgs::try_parse_from(["sitechat"]).unwrap();
        assert_eq!(args.static_port, 8000);
        assert_eq!(args.api_port, 8001);
        assert_eq!(args.host.to_string(), "127.0.0.1");
        assert!(args.profile.is_none());
    }
}
