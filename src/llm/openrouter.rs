//! OpenAI-compatible chat completions client (OpenRouter by default).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{
    error_message_from_body, ChatMessage, ChatResponse, LlmClient, LlmError, ToolCall,
    ToolDefinition,
};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f32,
}

impl OpenRouterClient {
    pub fn new(client: Client, api_key: String, base_url: Option<String>, temperature: f32) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client,
            api_key,
            base_url,
            temperature,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolSpec<'a>>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

fn build_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: Option<&'a [ToolDefinition]>,
    temperature: f32,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages,
        tools: tools.filter(|t| !t.is_empty()).map(|t| {
            t.iter()
                .map(|function| ToolSpec {
                    kind: "function",
                    function,
                })
                .collect()
        }),
        temperature,
    }
}

fn parse_response(response: ChatCompletionResponse) -> Result<ChatResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Decode("response contained no choices".to_string()))?;

    Ok(ChatResponse {
        content: choice.message.content.filter(|c| !c.is_empty()),
        tool_calls: choice.message.tool_calls.filter(|c| !c.is_empty()),
    })
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError> {
        let body = build_request(model, messages, tools, self.temperature);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %model, messages = messages.len(), "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                message: error_message_from_body(&text),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        parse_response(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wraps_tools_as_functions() {
        let tools = vec![ToolDefinition {
            name: "read_tasks".to_string(),
            description: "Read tasks".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("show tasks")];
        let request = build_request("google/gemini-2.5-flash", &messages, Some(tools.as_slice()), 0.4);
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["model"], "google/gemini-2.5-flash");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "read_tasks");
    }

    #[test]
    fn request_without_tools_omits_field() {
        let messages = vec![ChatMessage::user("hi")];
        let request = build_request("m", &messages, Some(&[][..]), 0.4);
        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn parses_tool_call_choice() {
        let raw = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "add_task", "arguments": "{\"task\":\"Call Bob\"}"}
                    }]
                }
            }]
        });
        let parsed: ChatCompletionResponse = serde_json::from_value(raw).expect("decode");
        let response = parse_response(parsed).expect("parse");
        assert_eq!(response.content, None);
        let calls = response.tool_calls.expect("calls");
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].function.arguments, "{\"task\":\"Call Bob\"}");
    }

    #[test]
    fn empty_choices_is_a_decode_error() {
        let parsed: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).expect("decode");
        assert!(matches!(parse_response(parsed), Err(LlmError::Decode(_))));
    }
}
