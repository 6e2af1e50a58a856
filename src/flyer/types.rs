//! Core types for flyer generation.

use crate::error::{FlyerError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats recognised when encoding selected files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// An encoded image ready to be sent as an inline part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    /// Base64 payload (no data URL prefix).
    pub data: String,
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
}

impl ImageAttachment {
    /// Creates an attachment from an already encoded payload.
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encodes raw bytes, detecting the media type from magic bytes.
    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        let mime_type = ImageFormat::from_magic_bytes(bytes)
            .unwrap_or_default()
            .mime_type();
        Self::new(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        )
    }

    /// Returns the attachment as a data URL, suitable for a thumbnail.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Output language of all flyer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// English text.
    English,
    /// French text.
    #[default]
    French,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 2] = [Language::French, Language::English];

    /// Returns the language name embedded in the instruction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
        }
    }

    /// Example theme shown as a hint for this language.
    pub fn description_hint(&self) -> &'static str {
        match self {
            Self::English => "e.g., Admissions Open 2024-2025, Master's in Management...",
            Self::French => "Ex: Admissions ouvertes 2024-2025, Master en Gestion...",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of flyer text relative to the supplied images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextPosition {
    /// Text block above the images.
    #[serde(rename = "Top (above images)")]
    Top,
    /// Text block below the images.
    #[default]
    #[serde(rename = "Bottom (below images)")]
    Bottom,
    /// Text column left of the images.
    #[serde(rename = "Left of images")]
    Left,
    /// Text column right of the images.
    #[serde(rename = "Right of images")]
    Right,
    /// Text drawn over the left side of the images.
    #[serde(rename = "Overlay - Left")]
    OverlayLeft,
    /// Text drawn over the center of the images.
    #[serde(rename = "Overlay - Center")]
    OverlayCenter,
    /// Text drawn over the right side of the images.
    #[serde(rename = "Overlay - Right")]
    OverlayRight,
}

impl TextPosition {
    /// All positions, in the order they are offered to the user.
    pub const ALL: [TextPosition; 7] = [
        TextPosition::Top,
        TextPosition::Bottom,
        TextPosition::Left,
        TextPosition::Right,
        TextPosition::OverlayLeft,
        TextPosition::OverlayCenter,
        TextPosition::OverlayRight,
    ];

    /// Returns the label embedded in the instruction.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Top => "Top (above images)",
            Self::Bottom => "Bottom (below images)",
            Self::Left => "Left of images",
            Self::Right => "Right of images",
            Self::OverlayLeft => "Overlay - Left",
            Self::OverlayCenter => "Overlay - Center",
            Self::OverlayRight => "Overlay - Right",
        }
    }

    /// Returns true when text is drawn on top of the images.
    pub fn is_overlay(&self) -> bool {
        matches!(
            self,
            Self::OverlayLeft | Self::OverlayCenter | Self::OverlayRight
        )
    }
}

impl std::fmt::Display for TextPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Named background color presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackgroundPreset {
    /// Blue and White.
    #[default]
    Institutional,
    /// Navy Blue and Gold.
    NavyGold,
    /// Dark Grey and Silver.
    ProfessionalGrey,
    /// Deep Green and White.
    AcademicGreen,
}

impl BackgroundPreset {
    /// All presets, in display order.
    pub const ALL: [BackgroundPreset; 4] = [
        BackgroundPreset::Institutional,
        BackgroundPreset::NavyGold,
        BackgroundPreset::ProfessionalGrey,
        BackgroundPreset::AcademicGreen,
    ];

    /// Display name of the preset.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Institutional => "Institutional",
            Self::NavyGold => "Navy & Gold",
            Self::ProfessionalGrey => "Professional Grey",
            Self::AcademicGreen => "Academic Green",
        }
    }

    /// Color description written into the background field.
    pub fn colors(&self) -> &'static str {
        match self {
            Self::Institutional => "Blue and White",
            Self::NavyGold => "Navy Blue and Gold",
            Self::ProfessionalGrey => "Dark Grey and Silver",
            Self::AcademicGreen => "Deep Green and White",
        }
    }
}

/// One flyer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerRequest {
    /// Free-text theme of the flyer.
    pub description: String,
    /// Output language.
    pub language: Language,
    /// Background color description.
    pub background_color: String,
    /// Text placement.
    pub text_position: TextPosition,
    /// Extra phone numbers appended to the official ones.
    pub extra_phones: String,
    /// User photos, in the order they must be sent.
    pub user_images: Vec<ImageAttachment>,
    /// Official logo, sent before the photos.
    pub logo: Option<ImageAttachment>,
}

impl FlyerRequest {
    /// Creates a request with default language, colors and placement.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            language: Language::default(),
            background_color: BackgroundPreset::default().colors().to_string(),
            text_position: TextPosition::default(),
            extra_phones: String::new(),
            user_images: Vec::new(),
            logo: None,
        }
    }

    /// Sets the output language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Sets the background color description.
    pub fn with_background_color(mut self, colors: impl Into<String>) -> Self {
        self.background_color = colors.into();
        self
    }

    /// Sets the text placement.
    pub fn with_text_position(mut self, position: TextPosition) -> Self {
        self.text_position = position;
        self
    }

    /// Sets the extra phone numbers.
    pub fn with_extra_phones(mut self, phones: impl Into<String>) -> Self {
        self.extra_phones = phones.into();
        self
    }

    /// Appends a user image.
    pub fn with_user_image(mut self, image: ImageAttachment) -> Self {
        self.user_images.push(image);
        self
    }

    /// Sets the logo.
    pub fn with_logo(mut self, logo: ImageAttachment) -> Self {
        self.logo = Some(logo);
        self
    }
}

/// Metadata about one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A generated flyer held as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated flyer should be stored or saved"]
pub struct GeneratedFlyer {
    data_url: String,
    mime_type: String,
    /// Generation metadata.
    pub metadata: FlyerMetadata,
}

impl GeneratedFlyer {
    /// Builds a flyer from a media type and base64 payload.
    pub fn new(mime_type: &str, base64_data: &str, metadata: FlyerMetadata) -> Self {
        Self {
            data_url: format!("data:{};base64,{}", mime_type, base64_data),
            mime_type: mime_type.to_string(),
            metadata,
        }
    }

    /// Returns the data URL used for preview.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Returns the media type reported by the model.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Decodes the image bytes from the data URL.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = self
            .data_url
            .split_once(";base64,")
            .map(|(_, b64)| b64)
            .ok_or_else(|| FlyerError::Decode("data URL has no base64 payload".into()))?;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| FlyerError::Decode(e.to_string()))
    }

    /// Writes the decoded image to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
