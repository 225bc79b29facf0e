use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ambos_core::{AiGateway, Error, Result, ToolSpec};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Chat-completion client against an OpenRouter-compatible gateway.
pub struct OpenRouterGateway {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
    app_name: Option<String>,
    site_url: Option<String>,
}

impl OpenRouterGateway {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
            base_url: OPENROUTER_API_URL.to_string(),
            app_name: None,
            site_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(model = %request.model, "gateway chat request");

        let mut builder = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request);
        if let Some(url) = &self.site_url {
            builder = builder.header("HTTP-Referer", url);
        }
        if let Some(name) = &self.app_name {
            builder = builder.header("X-Title", name);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            // Rate-limit and payment conditions are surfaced without
            // touching the body at all.
            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::PAYMENT_REQUIRED {
                return Err(error_for_status(status, String::new()));
            }
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, body));
        }

        Ok(response.json().await?)
    }
}

/// Map a non-2xx gateway status onto the error taxonomy.
pub(crate) fn error_for_status(status: StatusCode, body: String) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
        StatusCode::PAYMENT_REQUIRED => Error::PaymentRequired,
        _ => Error::Upstream(format!("AI gateway error ({status}): {body}")),
    }
}

#[async_trait]
impl AiGateway for OpenRouterGateway {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.2),
            tools: None,
            tool_choice: None,
        };

        let response = self.send(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Upstream("no content in AI response".to_string()))
    }

    async fn complete_with_tool(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<serde_json::Value> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.0),
            tools: Some(vec![ToolWire {
                kind: "function".to_string(),
                function: FunctionWire {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            }]),
            tool_choice: Some(serde_json::json!({
                "type": "function",
                "function": { "name": tool.name },
            })),
        };

        let response = self.send(&request).await?;
        let call = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.tool_calls)
            .and_then(|calls| calls.into_iter().next())
            .ok_or_else(|| Error::Parse("no tool call in AI response".to_string()))?;

        serde_json::from_str(&call.function.arguments)
            .map_err(|e| Error::Parse(format!("malformed tool arguments: {e}")))
    }
}

// Wire types for the OpenAI-compatible chat completions endpoint.

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ToolWire {
    #[serde(rename = "type")]
    kind: String,
    function: FunctionWire,
}

#[derive(Debug, Serialize)]
struct FunctionWire {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct ToolCallFunction {
    #[allow(dead_code)]
    #[serde(default)]
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_maps_to_rate_limited() {
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            Error::RateLimited
        ));
    }

    #[test]
    fn status_402_maps_to_payment_required() {
        assert!(matches!(
            error_for_status(StatusCode::PAYMENT_REQUIRED, String::new()),
            Error::PaymentRequired
        ));
    }

    #[test]
    fn other_statuses_map_to_upstream() {
        let err = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        match err {
            Error::Upstream(msg) => assert!(msg.contains("boom")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn response_with_tool_call_deserializes() {
        let raw = r#"{
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "extract", "arguments": "{\"entities\": []}"}
                    }]
                }
            }]
        }"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let calls = response.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.arguments, r#"{"entities": []}"#);
    }
}
