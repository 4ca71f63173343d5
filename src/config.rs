use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Serialize;

use crate::intake::DEFAULT_MAX_RETRIES;

/// Application-level constants
pub const APP_NAME: &str = "KodomoNavi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix tried before the bare variable name (shared with the web front end's `.env`).
pub const ENV_PREFIX: &str = "VITE_";

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-7-sonnet-20250219-v1:0";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.999;
pub const DEFAULT_TOP_K: u32 = 250;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "kodomo_navi_lib=debug,tower_http=debug,info"
    } else {
        "kodomo_navi_lib=info,warn"
    }
}

/// AWS credentials. `Debug` never prints the secret or token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub region: String,
    pub credentials: Option<Credentials>,
    pub model_id: String,
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            credentials: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Startup report on provider configuration. Holds no secret values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigStatus {
    pub region: String,
    pub region_valid: bool,
    pub has_access_key: bool,
    pub has_secret_key: bool,
    pub has_session_token: bool,
    pub model_id: String,
    pub model_valid: bool,
}

impl ConfigStatus {
    pub fn is_ready(&self) -> bool {
        self.region_valid && self.has_access_key && self.has_secret_key && self.model_valid
    }
}

/// Look `name` up with the front-end prefix first, then bare. Blank values count as unset.
fn lookup_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(&format!("{ENV_PREFIX}{name}"))
        .or_else(|| lookup(name))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    match lookup_var(lookup, name) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, "Ignoring unparsable setting, using default");
            default
        }),
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let access_key = lookup_var(&lookup, "AWS_ACCESS_KEY_ID");
        let secret_key = lookup_var(&lookup, "AWS_SECRET_ACCESS_KEY");
        let credentials = match (access_key, secret_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
                session_token: lookup_var(&lookup, "AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        Self {
            region: lookup_var(&lookup, "AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            credentials,
            model_id: lookup_var(&lookup, "BEDROCK_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_MODEL_ID.into()),
            anthropic_version: lookup_var(&lookup, "ANTHROPIC_VERSION")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_VERSION.into()),
            max_tokens: parse_var(&lookup, "MAX_TOKENS", DEFAULT_MAX_TOKENS),
            temperature: parse_var(&lookup, "TEMPERATURE", DEFAULT_TEMPERATURE),
            top_p: parse_var(&lookup, "TOP_P", DEFAULT_TOP_P),
            top_k: parse_var(&lookup, "TOP_K", DEFAULT_TOP_K),
            timeout_secs: parse_var(&lookup, "PROVIDER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            max_retries: parse_var(&lookup, "PROVIDER_MAX_RETRIES", DEFAULT_MAX_RETRIES),
        }
    }

    pub fn bedrock_host(&self) -> String {
        format!("bedrock-runtime.{}.amazonaws.com", self.region)
    }

    pub fn bedrock_endpoint(&self) -> String {
        format!("https://{}/model/{}/invoke", self.bedrock_host(), self.model_id)
    }

    pub fn diagnose(&self) -> ConfigStatus {
        let region_valid = !self.region.is_empty()
            && self
                .region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        ConfigStatus {
            region: self.region.clone(),
            region_valid,
            has_access_key: self.credentials.is_some(),
            has_secret_key: self.credentials.is_some(),
            has_session_token: self
                .credentials
                .as_ref()
                .is_some_and(|c| c.session_token.is_some()),
            model_id: self.model_id.clone(),
            model_valid: self.model_id.starts_with("anthropic."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub places_api_key: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_addr = SocketAddr::from(([127, 0, 0, 1], 8787));
        Self {
            bind_addr: parse_var(&lookup, "INTAKE_BIND_ADDR", default_addr),
            places_api_key: lookup_var(&lookup, "GOOGLE_MAPS_API_KEY"),
        }
    }
}

/// Everything `run()` needs, loaded once.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            provider: ProviderConfig::from_env(),
            server: ServerConfig::from_env(),
        }
    }
}
