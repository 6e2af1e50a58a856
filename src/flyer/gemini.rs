//! Gemini (Google) `generateContent` client.

use crate::error::{parse_retry_after, sanitize_error_message, FlyerError, Result};
use crate::flyer::content::{GenerateContentRequest, GenerateContentResponse};
use crate::flyer::generator::ContentGenerator;
use async_trait::async_trait;
use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image.
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image.
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API root, e.g. for a proxy.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a request timeout. Without one, reqwest's default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            })
            .ok_or_else(|| {
                FlyerError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(GeminiClient {
            client: client.build()?,
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new [`GeminiClientBuilder`].
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> FlyerError {
    let text = sanitize_error_message(text);
    match status {
        401 | 403 => FlyerError::Auth(text),
        404 => FlyerError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        ),
        429 => FlyerError::RateLimited {
            retry_after: parse_retry_after(headers).map(Duration::from_secs),
        },
        // Gemini reports a bad key as 400 INVALID_ARGUMENT
        400 if text.to_lowercase().contains("api key") => FlyerError::Auth(text),
        _ => {
            let lower = text.to_lowercase();
            if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited")
            {
                FlyerError::ContentBlocked(text)
            } else {
                FlyerError::Api {
                    status,
                    message: text,
                }
            }
        }
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);
        tracing::debug!(%url, parts = request.parts().count(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        // Blocked prompts arrive as 200 with no candidates; the caller
        // treats them like any other response without an image
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "gemini-3-pro-image-preview"
        );
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let client = GeminiClientBuilder::new()
            .api_key("test-key")
            .timeout(Duration::from_secs(120))
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = GeminiClient::builder()
            .api_key("test-key")
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash-image"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn test_default_endpoint() {
        let client = GeminiClient::builder().api_key("k").build().unwrap();
        assert_eq!(
            client.endpoint(GeminiModel::NanoBanana.as_str()),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn test_parse_error_status_mapping() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(401, "denied", &headers),
            FlyerError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            FlyerError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(429, "quota", &headers),
            FlyerError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(500, "internal", &headers),
            FlyerError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_parse_error_invalid_key_is_auth() {
        let headers = reqwest::header::HeaderMap::new();
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}}"#;
        match parse_error(400, body, &headers) {
            FlyerError::Auth(message) => {
                assert_eq!(message, "API key not valid. Please pass a valid API key.")
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_rate_limit_reads_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());
        match parse_error(429, "", &headers) {
            FlyerError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(12)))
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_safety_is_content_blocked() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(400, "Request blocked by safety settings", &headers),
            FlyerError::ContentBlocked(_)
        ));
    }

    /// Answers one HTTP request with `status` and `body`, returning the raw request.
    async fn serve_once(
        status: &'static str,
        extra_headers: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (base_url, handle)
    }

    fn local_client(base_url: &str) -> GeminiClient {
        GeminiClient::builder()
            .api_key("test-key")
            .base_url(base_url)
            .build()
            .unwrap()
    }

    fn sample_body() -> GenerateContentRequest {
        use crate::flyer::content::Part;
        GenerateContentRequest::image(vec![Part::text("Affiche IUG")], "3:4")
    }

    #[tokio::test]
    async fn test_generate_content_parses_inline_image() {
        let (base_url, server) = serve_once(
            "200 OK",
            "",
            r#"{"candidates":[{"content":{"parts":[{"text":"ok"},{"inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}}]},"finishReason":"STOP"}]}"#,
        )
        .await;

        let response = local_client(&base_url)
            .generate_content("gemini-2.5-flash-image", &sample_body())
            .await
            .unwrap();
        let inline = crate::flyer::content::find_first_inline_image(&response).unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");

        let raw = server.await.unwrap();
        assert!(raw.starts_with(
            "POST /v1beta/models/gemini-2.5-flash-image:generateContent HTTP/1.1\r\n"
        ));
        assert!(raw.to_lowercase().contains("x-goog-api-key: test-key\r\n"));
        assert!(raw.contains(r#""aspectRatio":"3:4""#));
    }

    #[tokio::test]
    async fn test_generate_content_rate_limit_uses_response_headers() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            "Retry-After: 7\r\n",
            r#"{"error":{"code":429,"message":"Resource exhausted"}}"#,
        )
        .await;

        let err = local_client(&base_url)
            .generate_content("m", &sample_body())
            .await
            .unwrap_err();
        match err {
            FlyerError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)))
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_content_unauthorized_is_auth() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            "",
            r#"{"error":{"code":401,"message":"Request had invalid authentication credentials."}}"#,
        )
        .await;

        let err = local_client(&base_url)
            .generate_content("m", &sample_body())
            .await
            .unwrap_err();
        match err {
            FlyerError::Auth(message) => {
                assert_eq!(message, "Request had invalid authentication credentials.")
            }
            other => panic!("expected auth error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_content_blocked_prompt_is_plain_response() {
        let (base_url, server) =
            serve_once("200 OK", "", r#"{"promptFeedback":{"blockReason":"OTHER"}}"#).await;

        let response = local_client(&base_url)
            .generate_content("m", &sample_body())
            .await
            .unwrap();
        assert!(response.candidates.is_empty());
        assert_eq!(
            response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref()),
            Some("OTHER")
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_blocked_prompt_yields_fixed_generation_message() {
        use crate::error::NO_IMAGE_MESSAGE;
        use crate::flyer::dispatcher::FlyerDispatcher;
        use crate::flyer::types::FlyerRequest;

        let (base_url, server) =
            serve_once("200 OK", "", r#"{"promptFeedback":{"blockReason":"OTHER"}}"#).await;

        let dispatcher = FlyerDispatcher::new(local_client(&base_url), "m");
        let err = dispatcher
            .generate(&FlyerRequest::new("Journée portes ouvertes"))
            .await
            .unwrap_err();

        assert!(matches!(err, FlyerError::Generation(_)));
        assert_eq!(err.to_string(), NO_IMAGE_MESSAGE);
        assert_eq!(err.user_message(), NO_IMAGE_MESSAGE);
        server.await.unwrap();
    }
}
