//! `generateContent` request and response shapes.
//!
//! These mirror the Gemini REST wire format closely enough to serialize
//! directly, and are what [`ContentGenerator`](crate::ContentGenerator)
//! implementations exchange.

use crate::flyer::types::ImageAttachment;
use serde::{Deserialize, Serialize};

/// Body of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; flyers always send exactly one.
    pub contents: Vec<Content>,
    /// Output configuration.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Wraps `parts` in a single turn asking for an image of `aspect_ratio`.
    pub fn image(parts: Vec<Part>, aspect_ratio: &str) -> Self {
        Self {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: aspect_ratio.to_string(),
                },
            },
        }
    }

    /// Iterates over every part of every turn.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.contents.iter().flat_map(|c| c.parts.iter())
    }
}

/// One turn of content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    /// Ordered parts of the turn.
    pub parts: Vec<Part>,
}

/// A part in a request: text or inline image data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    /// Instruction text.
    Text {
        /// The text.
        text: String,
    },
    /// Inline image bytes.
    InlineData {
        /// The encoded image.
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an inline image part from an attachment.
    pub fn image(attachment: &ImageAttachment) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: attachment.mime_type.clone(),
                data: attachment.data.clone(),
            },
        }
    }

    /// Returns the inline image, if this is an image part.
    pub fn as_inline_data(&self) -> Option<&InlineData> {
        match self {
            Self::InlineData { inline_data } => Some(inline_data),
            Self::Text { .. } => None,
        }
    }
}

/// Base64 image bytes with their media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

/// Output configuration for a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Requested output modalities.
    pub response_modalities: Vec<String>,
    /// Image output options.
    pub image_config: ImageConfig,
}

/// Image output options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Aspect ratio such as `3:4`.
    pub aspect_ratio: String,
}

/// Response of a `generateContent` call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate outputs.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback on the prompt, set when it was blocked.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One candidate output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content, absent when the candidate was filtered.
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A part in a response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text emitted by the model.
    #[serde(default)]
    pub text: Option<String>,
    /// Inline image bytes.
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Prompt-level feedback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason code.
    #[serde(default)]
    pub block_reason: Option<String>,
    /// Human readable block reason.
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

/// Returns the first inline image across all candidates, in order.
pub fn find_first_inline_image(response: &GenerateContentResponse) -> Option<&InlineData> {
    for candidate in &response.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            if let Some(inline) = &part.inline_data {
                return Some(inline);
            }
        }
    }
    None
}
