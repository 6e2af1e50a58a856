//! Builds one flyer request, sends it and unwraps the image.

use crate::error::{FlyerError, Result, NO_IMAGE_MESSAGE};
use crate::flyer::content::{find_first_inline_image, GenerateContentRequest, Part};
use crate::flyer::generator::ContentGenerator;
use crate::flyer::prompt::build_instruction;
use crate::flyer::types::{FlyerMetadata, FlyerRequest, GeneratedFlyer};
use std::time::Instant;

/// Aspect ratio of every generated flyer.
pub const FLYER_ASPECT_RATIO: &str = "3:4";

/// Builds the ordered parts for `request`: instruction, logo, user images.
pub fn build_parts(request: &FlyerRequest) -> Vec<Part> {
    let mut parts = Vec::with_capacity(2 + request.user_images.len());
    parts.push(Part::text(build_instruction(request)));

    if let Some(ref logo) = request.logo {
        parts.push(Part::image(logo));
    }

    parts.extend(request.user_images.iter().map(Part::image));
    parts
}

/// Builds the complete `generateContent` body for `request`.
pub fn build_content_request(request: &FlyerRequest) -> GenerateContentRequest {
    GenerateContentRequest::image(build_parts(request), FLYER_ASPECT_RATIO)
}

/// Sends flyer requests through a [`ContentGenerator`].
///
/// Holds no per-request state; every call is independent.
pub struct FlyerDispatcher<G> {
    generator: G,
    model: String,
}

impl<G: ContentGenerator> FlyerDispatcher<G> {
    /// Creates a dispatcher targeting `model`.
    pub fn new(generator: G, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Returns the model identifier requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the underlying generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generates one flyer.
    ///
    /// Issues exactly one remote call. Transport errors are returned as-is;
    /// a response without an inline image yields [`FlyerError::Generation`].
    pub async fn generate(&self, request: &FlyerRequest) -> Result<GeneratedFlyer> {
        let start = Instant::now();
        let body = build_content_request(request);

        tracing::debug!(
            generator = self.generator.name(),
            model = %self.model,
            user_images = request.user_images.len(),
            has_logo = request.logo.is_some(),
            language = %request.language,
            text_position = %request.text_position,
            "dispatching flyer request"
        );

        let response = self.generator.generate_content(&self.model, &body).await?;

        let inline = find_first_inline_image(&response).ok_or_else(|| {
            let finish_reasons: Vec<&str> = response
                .candidates
                .iter()
                .filter_map(|c| c.finish_reason.as_deref())
                .collect();
            let block_reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref());
            tracing::warn!(
                candidates = response.candidates.len(),
                ?finish_reasons,
                ?block_reason,
                "response contained no inline image"
            );
            FlyerError::Generation(NO_IMAGE_MESSAGE.to_string())
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(mime_type = %inline.mime_type, duration_ms, "flyer generated");

        Ok(GeneratedFlyer::new(
            &inline.mime_type,
            &inline.data,
            FlyerMetadata {
                model: Some(self.model.clone()),
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`ContentGenerator`] for tests.

    use super::*;
    use crate::flyer::content::GenerateContentResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) enum Reply {
        Json(&'static str),
        Error(fn() -> FlyerError),
    }

    /// Records every call and answers with a fixed reply.
    pub(crate) struct MockGenerator {
        reply: Reply,
        delay: Option<Duration>,
        pub(crate) calls: Mutex<Vec<(String, GenerateContentRequest)>>,
    }

    impl MockGenerator {
        pub(crate) fn replying(json: &'static str) -> Self {
            Self {
                reply: Reply::Json(json),
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(error: fn() -> FlyerError) -> Self {
            Self {
                reply: Reply::Error(error),
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ContentGenerator for MockGenerator {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), request.clone()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Reply::Json(json) => Ok(serde_json::from_str(json)?),
                Reply::Error(make) => Err(make()),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    pub(crate) const IMAGE_RESPONSE: &str = r#"{
        "candidates": [{
            "content": {
                "parts": [
                    {"text": "Voici votre affiche"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                ]
            },
            "finishReason": "STOP"
        }]
    }"#;

    pub(crate) const TEXT_ONLY_RESPONSE: &str = r#"{
        "candidates": [{
            "content": {"parts": [{"text": "I cannot create that image."}]},
            "finishReason": "STOP"
        }]
    }"#;
}
