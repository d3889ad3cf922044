//! Generative Language API client

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;
use url::Url;

use sikuwat_core::config::AssistantConfig;
use sikuwat_core::prompt::truncate_chars;

use super::{AssistantError, TextGenerator};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1/models/";
const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Upstream error bodies are cut to this many characters
const ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    min_retry_delay: Duration,
    max_retries: usize,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &AssistantConfig) -> Result<Self, AssistantError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sikuwat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AssistantError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: Url::parse(DEFAULT_ENDPOINT)
                .map_err(|e| AssistantError::Decode(e.to_string()))?,
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            min_retry_delay: Duration::from_secs(1),
            max_retries: 3,
        })
    }

    /// Point the client at another base URL (ends with `/models/`)
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_retry(mut self, min_delay: Duration, max_retries: usize) -> Self {
        self.min_retry_delay = min_delay;
        self.max_retries = max_retries;
        self
    }

    fn request_url(&self) -> Result<Url, AssistantError> {
        self.endpoint
            .join(&format!("./{}:generateContent", self.model))
            .map_err(|e| AssistantError::Decode(e.to_string()))
    }

    async fn send_request(&self, body: &Value) -> Result<String, AssistantError> {
        let res = self
            .http
            .post(self.request_url()?)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                body: truncate_chars(&text, ERROR_BODY_CHARS).to_string(),
            });
        }

        let data: Value = res
            .json()
            .await
            .map_err(|e| AssistantError::Decode(e.to_string()))?;
        Ok(extract_text(&data))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            }
        });

        (|| async { self.send_request(&body).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(self.min_retry_delay)
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(self.max_retries)
                    .with_jitter(),
            )
            .when(|e: &AssistantError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    "Generative API call failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AssistantError {
    if e.is_timeout() {
        AssistantError::Timeout
    } else {
        AssistantError::Transport(e.without_url().to_string())
    }
}

/// Answer text from a generateContent response, trying the known shapes
/// before falling back to the raw JSON
pub fn extract_text(data: &Value) -> String {
    let candidate = &data["candidates"][0];
    [
        &candidate["content"]["parts"][0]["text"],
        &candidate["output"],
        &candidate["content"],
        &data["outputText"],
    ]
    .into_iter()
    .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
    .map(str::to_string)
    .unwrap_or_else(|| data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn extracts_standard_shape() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Tanam saat awal musim hujan." }] } }]
        });
        assert_eq!(extract_text(&data), "Tanam saat awal musim hujan.");
    }

    #[test]
    fn extracts_alternative_shapes() {
        assert_eq!(extract_text(&json!({ "candidates": [{ "output": "A" }] })), "A");
        assert_eq!(extract_text(&json!({ "outputText": "B" })), "B");
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(extract_text(&raw), raw.to_string());
    }

    /// Upstream that fails `failures` times with `status`, then answers
    async fn spawn_upstream(status: StatusCode, failures: usize) -> (Url, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/v1/models/{call}",
            post(
                move |uri: axum::http::Uri, headers: HeaderMap, Json(body): Json<Value>| {
                    let counter = counter.clone();
                    async move {
                        assert_eq!(headers[API_KEY_HEADER], "test-key");
                        assert!(uri.query().is_none());
                        assert_eq!(body["generationConfig"]["maxOutputTokens"], 800);
                        let n = counter.fetch_add(1, Ordering::SeqCst);
                        if n < failures {
                            Err((status, "upstream says no"))
                        } else {
                            Ok(Json(json!({
                                "candidates": [{ "content": { "parts": [{ "text": "jawaban" }] } }]
                            })))
                        }
                    }
                },
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let url = Url::parse(&format!("http://{}/v1/models/", addr)).unwrap();
        (url, calls)
    }

    fn client(endpoint: Url) -> GeminiClient {
        GeminiClient::new("test-key", &AssistantConfig::default())
            .unwrap()
            .with_endpoint(endpoint)
            .with_retry(Duration::from_millis(1), 3)
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let (url, calls) = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, 2).await;
        let text = client(url).generate("halo").await.unwrap();
        assert_eq!(text, "jawaban");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (url, calls) = spawn_upstream(StatusCode::BAD_REQUEST, 5).await;
        match client(url).generate("halo").await {
            Err(AssistantError::Upstream { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "upstream says no");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connection_errors_do_not_carry_the_key() {
        let endpoint = Url::parse("http://127.0.0.1:1/v1/models/").unwrap();
        let err = GeminiClient::new("SECRET-KEY-123", &AssistantConfig::default())
            .unwrap()
            .with_endpoint(endpoint)
            .with_retry(Duration::from_millis(1), 0)
            .generate("halo")
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::Transport(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!err.to_string().contains("127.0.0.1"));
    }
}
