//! Flyer request building and dispatch.

pub mod content;
mod dispatcher;
mod gemini;
mod generator;
pub mod prompt;
mod types;

pub use content::{find_first_inline_image, GenerateContentRequest, GenerateContentResponse};
pub use dispatcher::{build_content_request, build_parts, FlyerDispatcher, FLYER_ASPECT_RATIO};
pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel, API_KEY_ENV_VARS};
pub use generator::ContentGenerator;
pub use types::{
    BackgroundPreset, FlyerMetadata, FlyerRequest, GeneratedFlyer, ImageAttachment, ImageFormat,
    Language, TextPosition,
};

#[cfg(test)]
pub(crate) use dispatcher::testing;
