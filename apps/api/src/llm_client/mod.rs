/// LLM Client: the single point of entry for all Gemini API calls in JobHunter.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All resume analysis, job matching, search and interview turns go through here.
///
/// Model: gemini-2.5-flash (hardcoded so every feature scores against the same model)
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls in JobHunter.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("No response from AI")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (camelCase on the wire)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// One part of a message: either plain text or an inline binary attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData },
    Text { text: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::Inline {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::Inline { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// A web citation returned alongside grounded search text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(Part::as_text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn grounding_chunks(&self) -> Vec<GroundingChunk> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Text and citations produced by a grounded search call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// The single LLM client used by all services in JobHunter.
/// Wraps the Gemini generateContent API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, MODEL)
    }

    /// Makes a raw generateContent call, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: GenerateResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage_metadata {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the model with a response schema and deserializes the JSON it returns.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        parts: Vec<Part>,
        system: Option<&str>,
        schema: Value,
    ) -> Result<T, LlmError> {
        let contents = [Content::user(parts)];
        let request = json_request(&contents, system, schema);
        let response = self.generate(&request).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(strip_json_fences(&text)).map_err(LlmError::Parse)
    }

    /// Runs a prompt with the Google Search tool enabled.
    pub async fn search(&self, parts: Vec<Part>) -> Result<SearchOutput, LlmError> {
        let contents = [Content::user(parts)];
        let request = search_request(&contents);
        let response = self.generate(&request).await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(SearchOutput {
            text,
            grounding_chunks: response.grounding_chunks(),
        })
    }

    /// Sends a full multi-turn conversation and returns the model's next message.
    pub async fn chat(&self, history: &[Content], system: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: history,
            system_instruction: Some(system_content(system)),
            generation_config: None,
            tools: Vec::new(),
        };
        let response = self.generate(&request).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }
}

fn system_content(system: &str) -> Content {
    Content {
        role: None,
        parts: vec![Part::text(system)],
    }
}

fn json_request<'a>(
    contents: &'a [Content],
    system: Option<&str>,
    schema: Value,
) -> GenerateRequest<'a> {
    GenerateRequest {
        contents,
        system_instruction: system.map(system_content),
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json"),
            response_schema: Some(schema),
        }),
        tools: Vec::new(),
    }
}

fn search_request(contents: &[Content]) -> GenerateRequest<'_> {
    GenerateRequest {
        contents,
        system_instruction: None,
        generation_config: None,
        tools: vec![serde_json::json!({ "googleSearch": {} })],
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parts_serialize_in_gemini_shape() {
        let parts = vec![Part::inline("application/pdf", "JVBERi0="), Part::text("Analyze")];
        let value = serde_json::to_value(&parts).unwrap();
        assert_eq!(
            value,
            json!([
                {"inlineData": {"mimeType": "application/pdf", "data": "JVBERi0="}},
                {"text": "Analyze"}
            ])
        );
    }

    #[test]
    fn test_json_request_carries_schema_and_system() {
        let contents = [Content::user(vec![Part::text("hi")])];
        let request = json_request(&contents, Some("be terse"), json!({"type": "OBJECT"}));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be terse");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_search_request_enables_google_search() {
        let contents = [Content::user(vec![Part::text("rust jobs")])];
        let value = serde_json::to_value(search_request(&contents)).unwrap();
        assert_eq!(value["tools"], json!([{"googleSearch": {}}]));
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_and_grounding() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Found "}, {"text": "3 jobs"}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://jobs.example.com/1", "title": "Rust Engineer"}},
                        {"web": {"uri": "https://jobs.example.com/2"}}
                    ]
                }
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 30}
        });
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("Found 3 jobs"));
        let chunks = response.grounding_chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0].web.as_ref().unwrap().title.as_deref(),
            Some("Rust Engineer")
        );
        assert!(chunks[1].web.as_ref().unwrap().title.is_none());
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.text().is_none());
        assert!(response.grounding_chunks().is_empty());
    }

    #[test]
    fn test_blank_text_counts_as_empty() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]});
        let response: GenerateResponse = serde_json::from_value(body).unwrap();
        assert!(response.text().is_none());
    }
}
