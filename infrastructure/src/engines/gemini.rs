//! Cloud engine backed by the Gemini `generateContent` REST endpoint.
//!
//! Tool schemas are sent as function declarations with upper-cased type
//! tags. Only user turns are sent as contents. The `functionCall` parts of the
//! reply are re-encoded as a `function_calls` payload so the cloud answer is
//! validated exactly like on-device output.

use async_trait::async_trait;
use fncall_application::ports::generation_engine::{
    EngineError, GenerationEngine, GenerationRequest,
};
use fncall_domain::{EngineKind, ToolSet};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`GenerationEngine`] that calls Gemini over HTTPS.
pub struct GeminiEngine {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiEngine {
    pub fn new(config: GeminiConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Function declarations in Gemini's schema dialect.
pub fn function_declarations(tools: &ToolSet) -> Value {
    let declarations: Vec<Value> = tools
        .iter()
        .map(|tool| {
            let properties: Map<String, Value> = tool
                .parameters()
                .iter()
                .map(|p| {
                    let type_tag = p.type_tag.as_deref().unwrap_or("string").to_uppercase();
                    (
                        p.name.clone(),
                        json!({
                            "type": type_tag,
                            "description": p.description.clone().unwrap_or_default(),
                        }),
                    )
                })
                .collect();
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "parameters": {
                    "type": "OBJECT",
                    "properties": properties,
                    "required": tool.required_names(),
                },
            })
        })
        .collect();
    json!([{ "function_declarations": declarations }])
}

/// Request body: user turns as contents plus the declarations.
pub fn request_body(request: &GenerationRequest) -> Value {
    let contents: Vec<Value> = request
        .messages
        .iter()
        .filter(|m| m.is_user())
        .map(|m| json!({ "role": "user", "parts": [{ "text": m.content }] }))
        .collect();
    json!({
        "contents": contents,
        "tools": function_declarations(&request.tools),
    })
}

/// Re-encode the `functionCall` parts of every candidate as a payload.
pub fn encode_reply(reply: &Value, elapsed: Duration) -> String {
    let calls: Vec<Value> = reply
        .get("candidates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|c| c.pointer("/content/parts").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("functionCall"))
        .map(|call| {
            json!({
                "name": call.get("name").cloned().unwrap_or(Value::Null),
                "arguments": call.get("args").cloned().unwrap_or_else(|| json!({})),
            })
        })
        .collect();
    json!({
        "function_calls": calls,
        "total_time_ms": elapsed.as_secs_f64() * 1000.0,
    })
    .to_string()
}

#[async_trait]
impl GenerationEngine for GeminiEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Cloud
    }

    fn name(&self) -> String {
        self.config.model.clone()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        trace!("Gemini reply: {}", reply);

        let elapsed = start.elapsed();
        debug!("Gemini answered in {:.0}ms", elapsed.as_secs_f64() * 1000.0);
        Ok(encode_reply(&reply, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fncall_domain::{Message, ToolParameter, ToolSchema};

    fn tools() -> ToolSet {
        ToolSet::new(vec![
            ToolSchema::new("set_alarm", "Set an alarm")
                .with_parameter(
                    ToolParameter::new("hour", "integer", true).with_description("Hour"),
                )
                .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_declarations_upper_case_types() {
        let declarations = function_declarations(&tools());
        let decl = &declarations[0]["function_declarations"][0];

        assert_eq!(decl["name"], "set_alarm");
        assert_eq!(decl["parameters"]["type"], "OBJECT");
        assert_eq!(decl["parameters"]["properties"]["hour"]["type"], "INTEGER");
        assert_eq!(decl["parameters"]["required"], json!(["hour"]));
    }

    #[test]
    fn test_body_sends_user_turns_only() {
        let request = GenerationRequest::new(
            vec![
                Message::system("sys"),
                Message::user("wake me at 7"),
                Message::assistant("ok"),
            ],
            tools(),
        );
        let body = request_body(&request);

        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "wake me at 7");
    }

    #[test]
    fn test_reply_reencoded_as_payload() {
        let reply = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Setting it now."},
                    {"functionCall": {"name": "set_alarm", "args": {"hour": 7}}}
                ]}
            }]
        });
        let payload: Value =
            serde_json::from_str(&encode_reply(&reply, Duration::from_millis(120))).unwrap();

        assert_eq!(
            payload["function_calls"],
            json!([{"name": "set_alarm", "arguments": {"hour": 7}}])
        );
        assert_eq!(payload["total_time_ms"], 120.0);
    }

    #[test]
    fn test_reply_without_candidates_is_empty_payload() {
        let payload: Value =
            serde_json::from_str(&encode_reply(&json!({}), Duration::ZERO)).unwrap();
        assert_eq!(payload["function_calls"], json!([]));
    }
}
