//! Google Gemini `generateContent` client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    error_message_from_body, ChatMessage, ChatResponse, LlmClient, LlmError, Role, ToolCall,
    ToolDefinition,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f32,
}

impl GeminiClient {
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

#[async_trait]
impl LlmClient for GeminiClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError> {
        let body = build_request(messages, tools, self.temperature);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        tracing::debug!(model = %model, contents = body.contents.len(), "Calling Gemini");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;
        parse_response(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTools>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCallPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponsePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCallPart {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponsePart {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

fn text_part(text: String) -> Part {
    Part {
        text: Some(text),
        ..Part::default()
    }
}

/// Translate the OpenAI-style conversation into a Gemini request.
///
/// Consecutive tool results are grouped into a single `user` content so the
/// number of function responses matches the preceding function calls.
fn build_request(
    messages: &[ChatMessage],
    tools: Option<&[ToolDefinition]>,
    temperature: f32,
) -> GenerateContentRequest {
    let mut system_parts = Vec::new();
    let mut contents: Vec<Content> = Vec::new();
    let mut call_names: HashMap<&str, &str> = HashMap::new();

    for message in messages {
        match message.role {
            Role::System => {
                if let Some(text) = &message.content {
                    system_parts.push(text_part(text.clone()));
                }
            }
            Role::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![text_part(message.content.clone().unwrap_or_default())],
            }),
            Role::Assistant => {
                let mut parts = Vec::new();
                if let Some(text) = message.content.as_ref().filter(|t| !t.is_empty()) {
                    parts.push(text_part(text.clone()));
                }
                for call in message.tool_calls.iter().flatten() {
                    call_names.insert(call.id.as_str(), call.function.name.as_str());
                    let args = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| json!({}));
                    parts.push(Part {
                        function_call: Some(FunctionCallPart {
                            name: call.function.name.clone(),
                            args,
                        }),
                        ..Part::default()
                    });
                }
                if parts.is_empty() {
                    parts.push(text_part(String::new()));
                }
                contents.push(Content {
                    role: Some("model".to_string()),
                    parts,
                });
            }
            Role::Tool => {
                let name = message
                    .tool_call_id
                    .as_deref()
                    .and_then(|id| call_names.get(id).copied())
                    .unwrap_or("unknown_tool")
                    .to_string();
                let part = Part {
                    function_response: Some(FunctionResponsePart {
                        name,
                        response: json!({ "result": message.content.clone().unwrap_or_default() }),
                    }),
                    ..Part::default()
                };

                let extends_previous = contents.last().is_some_and(|c| {
                    c.role.as_deref() == Some("user")
                        && c.parts.iter().all(|p| p.function_response.is_some())
                });
                match contents.last_mut() {
                    Some(last) if extends_previous => last.parts.push(part),
                    _ => contents.push(Content {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    let declarations: Vec<FunctionDeclaration> = tools
        .unwrap_or_default()
        .iter()
        .map(|tool| FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: gemini_parameters(&tool.parameters),
        })
        .collect();

    GenerateContentRequest {
        system_instruction: (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        }),
        contents,
        tools: if declarations.is_empty() {
            Vec::new()
        } else {
            vec![GeminiTools {
                function_declarations: declarations,
            }]
        },
        generation_config: GenerationConfig { temperature },
    }
}

/// Gemini rejects object schemas without properties; omit them instead.
fn gemini_parameters(schema: &Value) -> Option<Value> {
    let has_properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty());
    has_properties.then(|| schema.clone())
}

fn parse_response(response: GenerateContentResponse) -> Result<ChatResponse, LlmError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .map(|f| f.to_string())
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(LlmError::Decode(format!("Gemini returned no candidates ({})", reason)));
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        return Err(LlmError::Decode(format!(
            "Gemini candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(call) = part.function_call {
            let id = format!("call_{}", tool_calls.len() + 1);
            tool_calls.push(ToolCall::new(id, call.name, call.args.to_string()));
        }
    }

    Ok(ChatResponse {
        content: (!text.is_empty()).then_some(text),
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "add_task".to_string(),
                description: "Add a task".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {"task": {"type": "string"}},
                    "required": ["task"]
                }),
            },
            ToolDefinition {
                name: "read_tasks".to_string(),
                description: "Read tasks".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
        ]
    }

    #[test]
    fn request_maps_roles_and_groups_tool_results() {
        let messages = vec![
            ChatMessage::system("be helpful"),
            ChatMessage::user("add milk and eggs"),
            ChatMessage::assistant_tool_calls(
                None,
                vec![
                    ToolCall::new("call_1", "add_task", r#"{"task":"milk"}"#),
                    ToolCall::new("call_2", "add_task", r#"{"task":"eggs"}"#),
                ],
            ),
            ChatMessage::tool_result("call_1", "Added task: milk"),
            ChatMessage::tool_result("call_2", "Added task: eggs"),
        ];
        let tools = tools();
        let request = build_request(&messages, Some(tools.as_slice()), 0.4);
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert_eq!(value["contents"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][1]["parts"][0]["functionCall"]["name"], "add_task");
        assert_eq!(value["contents"][1]["parts"][1]["functionCall"]["args"]["task"], "eggs");

        let responses = &value["contents"][2]["parts"];
        assert_eq!(responses.as_array().map(Vec::len), Some(2));
        assert_eq!(responses[0]["functionResponse"]["name"], "add_task");
        assert_eq!(
            responses[1]["functionResponse"]["response"]["result"],
            "Added task: eggs"
        );
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn empty_parameter_schema_is_omitted() {
        let tools = tools();
        let request = build_request(&[ChatMessage::user("hi")], Some(tools.as_slice()), 0.4);
        let value = serde_json::to_value(&request).expect("serialize");
        let decls = &value["tools"][0]["functionDeclarations"];
        assert!(decls[0].get("parameters").is_some());
        assert!(decls[1].get("parameters").is_none());
    }

    #[test]
    fn parses_function_call_response() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "add_task", "args": {"task": "buy milk"}}}]
                },
                "finishReason": "STOP"
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).expect("decode");
        let response = parse_response(parsed).expect("parse");

        assert_eq!(response.content, None);
        let calls = response.tool_calls.expect("tool calls");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.name, "add_task");
        let args: Value = serde_json::from_str(&calls[0].function.arguments).expect("args json");
        assert_eq!(args["task"], "buy milk");
    }

    #[test]
    fn parses_text_response() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Done. "}, {"text": "Added it."}]}
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).expect("decode");
        let response = parse_response(parsed).expect("parse");
        assert_eq!(response.content.as_deref(), Some("Done. Added it."));
        assert!(response.tool_calls.is_none());
    }

    #[test]
    fn missing_candidates_is_a_decode_error() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}}))
                .expect("decode");
        let err = parse_response(parsed).expect_err("should fail");
        assert!(matches!(err, LlmError::Decode(ref m) if m.contains("SAFETY")));
    }
}
