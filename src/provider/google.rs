// src/provider/google.rs — Google Generative AI (Gemini) provider

use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};

use super::{ChatChunk, ChatRequest, ChatResponse, ChunkStream, ModelProvider, Part, Role};
use crate::infra::errors::LumiereError;

const PROVIDER_ID: &str = "google";

pub struct GoogleProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a different endpoint (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the Gemini request body from a ChatRequest.
    fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Model => "model",
                };
                let parts: Vec<serde_json::Value> = m
                    .parts
                    .parts()
                    .iter()
                    .map(|p| match p {
                        Part::Text(text) => serde_json::json!({ "text": text }),
                        Part::InlineImage { mime_type, data } => serde_json::json!({
                            "inlineData": { "mimeType": mime_type, "data": data },
                        }),
                    })
                    .collect();
                serde_json::json!({ "role": role, "parts": parts })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
        });

        if let Some(ref system) = request.system {
            body["system_instruction"] = serde_json::json!({
                "parts": [{ "text": system }],
            });
        }

        let mut gen_config = serde_json::json!({});
        if let Some(max_tokens) = request.max_tokens {
            gen_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            gen_config["temperature"] = serde_json::json!(temp);
        }
        if gen_config != serde_json::json!({}) {
            body["generationConfig"] = gen_config;
        }

        body
    }

    fn url(&self, model: &str, method: &str, extra_query: &str) -> String {
        format!(
            "{}/models/{}:{}?{}key={}",
            self.base_url, model, method, extra_query, self.api_key,
        )
    }
}

/// Concatenate the text parts of `candidates[0]`. `None` when there are none.
fn candidate_text(resp: &serde_json::Value) -> Option<String> {
    let parts = resp["candidates"][0]["content"]["parts"].as_array()?;
    let mut text = String::new();
    let mut found = false;
    for part in parts {
        if let Some(t) = part["text"].as_str() {
            text.push_str(t);
            found = true;
        }
    }
    found.then_some(text)
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LumiereError> {
        let body = self.build_request_body(&request);
        let url = self.url(&request.model, "generateContent", "");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LumiereError::provider(PROVIDER_ID, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LumiereError::provider(
                PROVIDER_ID,
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            LumiereError::provider(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

        Ok(ChatResponse {
            text: candidate_text(&resp),
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream, LumiereError> {
        let body = self.build_request_body(&request);
        let url = self.url(&request.model, "streamGenerateContent", "alt=sse&");

        let mut es = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .eventsource()
            .map_err(|e| LumiereError::provider(PROVIDER_ID, e.to_string()))?;

        let stream = async_stream::stream! {
            while let Some(event) = es.next().await {
                match event {
                    Ok(Event::Open) => {}
                    Ok(Event::Message(msg)) => {
                        if msg.data == "[DONE]" {
                            break;
                        }
                        let parsed: serde_json::Value = match serde_json::from_str(&msg.data) {
                            Ok(v) => v,
                            Err(e) => {
                                yield Err(LumiereError::provider(
                                    PROVIDER_ID,
                                    format!("Failed to parse SSE data: {}", e),
                                ));
                                break;
                            }
                        };

                        if let Some(delta) = candidate_text(&parsed) {
                            if !delta.is_empty() {
                                yield Ok(ChatChunk { delta });
                            }
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(e) => {
                        yield Err(LumiereError::provider(
                            PROVIDER_ID,
                            format!("SSE stream error: {}", e),
                        ));
                        break;
                    }
                }
            }
            es.close();
        };

        Ok(Box::pin(stream))
    }
}
