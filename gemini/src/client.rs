use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gemini http {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gemini api error: {message}")]
    Api { message: String },

    #[error("prompt blocked: {reason}")]
    Blocked { reason: String },

    #[error("no content in gemini response")]
    EmptyResponse,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Blocking-per-call text generation against one Gemini model.
///
/// The underlying HTTP client is built without a timeout; a call either
/// returns a full completion or fails.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"***")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_model(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn new_with_model(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: normalize_model(&model),
            temperature: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send one prompt and return the trimmed completion text.
    pub async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let body = build_request(prompt, self.temperature);
        let started = Instant::now();
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "gemini request");

        let resp = self
            .http
            .post(self.build_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gemini response"
        );

        if !status.is_success() {
            warn!(status = status.as_u16(), "gemini request failed");
            // Prefer the structured API message when the body carries one.
            if let Ok(GenerateContentResponse { error: Some(err), .. }) =
                serde_json::from_str::<GenerateContentResponse>(&text)
            {
                return Err(GeminiError::Api { message: err.message });
            }
            return Err(GeminiError::Status { status: status.as_u16(), body: text });
        }

        parse_response(&text)
    }
}

/// Accepts both `gemini-1.5-flash` and the `models/gemini-1.5-flash` form.
fn normalize_model(model: &str) -> String {
    model.trim().trim_start_matches("models/").to_string()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request(prompt: &str, temperature: Option<f32>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part { text: prompt.to_string() }],
        }],
        generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
    }
}

fn parse_response(body: &str) -> Result<String, GeminiError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;

    if let Some(err) = parsed.error {
        return Err(GeminiError::Api { message: err.message });
    }
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GeminiError::Blocked { reason });
    }

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use std::sync::{Arc, Mutex};

    /// Serves one canned response for every request and records the API key header.
    async fn fake_gemini(
        status: StatusCode,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = axum::Router::new().fallback(move |headers: HeaderMap| {
            let recorder = recorder.clone();
            async move {
                let key = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                recorder.lock().unwrap().push(key);
                (status, body)
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1beta"), seen)
    }

    fn client_for(endpoint: &str) -> GeminiClient {
        GeminiClient::new("test-key".to_string()).with_endpoint(endpoint)
    }

    #[test]
    fn test_build_url_strips_models_prefix() {
        let client =
            GeminiClient::new_with_model("k".to_string(), "models/gemini-1.5-flash".to_string());
        assert_eq!(
            client.build_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );

        let client = client.with_endpoint("http://localhost:9000/v1beta/");
        assert_eq!(
            client.build_url(),
            "http://localhost:9000/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = GeminiClient::new("secret-key".to_string());
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(build_request("hello", None)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert!(body.get("generationConfig").is_none());

        let body = serde_json::to_value(build_request("hello", Some(0.5))).unwrap();
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_parse_response_joins_parts_and_trims() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"text":"  Venue: 40%\n"},{"text":"Catering: 30%  "}]}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Venue: 40%\nCatering: 30%");
    }

    #[test]
    fn test_parse_response_errors() {
        let api = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        assert!(matches!(
            parse_response(api),
            Err(GeminiError::Api { message }) if message == "API key not valid"
        ));

        let blocked = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(
            parse_response(blocked),
            Err(GeminiError::Blocked { reason }) if reason == "SAFETY"
        ));

        let empty = r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#;
        assert!(matches!(parse_response(empty), Err(GeminiError::EmptyResponse)));

        assert!(matches!(parse_response("not json"), Err(GeminiError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_generate_success_sends_api_key() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":" Plan ready "}]}}]}"#;
        let (endpoint, seen) = fake_gemini(StatusCode::OK, body).await;

        let text = client_for(&endpoint).generate("plan my wedding").await.unwrap();
        assert_eq!(text, "Plan ready");
        assert_eq!(*seen.lock().unwrap(), vec!["test-key".to_string()]);
    }

    #[tokio::test]
    async fn test_generate_error_status_prefers_api_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid"}}"#;
        let (endpoint, seen) = fake_gemini(StatusCode::BAD_REQUEST, body).await;

        let err = client_for(&endpoint).generate("hi").await.unwrap_err();
        assert!(matches!(err, GeminiError::Api { ref message } if message == "API key not valid"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_error_status_with_plain_body() {
        let (endpoint, _) = fake_gemini(StatusCode::INTERNAL_SERVER_ERROR, "backend down").await;

        let err = client_for(&endpoint).generate("hi").await.unwrap_err();
        assert!(matches!(
            err,
            GeminiError::Status { status: 500, ref body } if body == "backend down"
        ));
    }
}
