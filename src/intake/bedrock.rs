use std::time::Duration;

use chrono::Utc;
use futures_util::future::BoxFuture;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use super::provider::{AnalysisProvider, ProviderError};
use super::signing::{encode_path, sign_request, SigningRequest};
use crate::config::ProviderConfig;

const BEDROCK_SERVICE: &str = "bedrock";
const JSON_CONTENT_TYPE: &str = "application/json";

/// AWS Bedrock runtime client for Anthropic models.
pub struct BedrockClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl BedrockClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        let credentials = self
            .config
            .credentials
            .as_ref()
            .ok_or(ProviderError::MissingCredentials)?;

        let body = serde_json::to_vec(&InvokeRequest::new(&self.config, prompt))
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        let host = self.config.bedrock_host();
        let path = encode_path(&format!("/model/{}/invoke", self.config.model_id));

        let signed = sign_request(
            &SigningRequest {
                method: "POST",
                host: &host,
                path: &path,
                content_type: Some(JSON_CONTENT_TYPE),
                payload: &body,
            },
            credentials,
            &self.config.region,
            BEDROCK_SERVICE,
            Utc::now(),
        )?;

        let url = format!("https://{host}{path}");
        tracing::debug!(
            model = %self.config.model_id,
            region = %self.config.region,
            prompt_chars = prompt.chars().count(),
            "Invoking Bedrock model"
        );
        tracing::trace!(prompt = %prompt, "Bedrock prompt");

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization)
            .body(body);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ProviderError::Connection(host.clone())
            } else if e.is_timeout() {
                ProviderError::Timeout(self.config.timeout_secs)
            } else {
                ProviderError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedShape(e.to_string()))?;
        let text = extract_completion_text(&value)?;
        tracing::trace!(response = %text, "Bedrock response text");
        Ok(text)
    }
}

impl AnalysisProvider for BedrockClient {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ProviderError>> {
        Box::pin(self.invoke(prompt))
    }

    fn name(&self) -> &str {
        "bedrock"
    }
}

/// Body for `POST /model/{modelId}/invoke`.
#[derive(Debug, Serialize)]
pub struct InvokeRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: [TextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

impl<'a> InvokeRequest<'a> {
    pub fn new(config: &'a ProviderConfig, prompt: &'a str) -> Self {
        Self {
            anthropic_version: &config.anthropic_version,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            messages: [Message {
                role: "user",
                content: [TextBlock { kind: "text", text: prompt }],
            }],
        }
    }
}

/// Pull `content[0].text` out of an invoke response.
pub fn extract_completion_text(body: &serde_json::Value) -> Result<String, ProviderError> {
    body.get("content")
        .and_then(|c| c.get(0))
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::UnexpectedShape("missing content[0].text".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let config = ProviderConfig::default();
        let body = serde_json::to_value(InvokeRequest::new(&config, "こんにちは")).unwrap();
        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["top_k"], 250);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(body["messages"][0]["content"][0]["text"], "こんにちは");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn extracts_first_text_block() {
        let body = json!({
            "id": "msg_1",
            "content": [{"type": "text", "text": "{\"recommendedDepartment\":\"内科\"}"}],
            "stop_reason": "end_turn"
        });
        assert_eq!(
            extract_completion_text(&body).unwrap(),
            "{\"recommendedDepartment\":\"内科\"}"
        );
    }

    #[test]
    fn missing_text_is_unexpected_shape() {
        for body in [json!({}), json!({"content": []}), json!({"content": [{"type": "image"}]})] {
            assert!(matches!(
                extract_completion_text(&body),
                Err(ProviderError::UnexpectedShape(_))
            ));
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_sending() {
        let config = ProviderConfig {
            credentials: None,
            ..ProviderConfig::default()
        };
        let client = BedrockClient::new(config).unwrap();
        assert_eq!(
            client.complete("prompt").await,
            Err(ProviderError::MissingCredentials)
        );
    }
}
