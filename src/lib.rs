#![warn(missing_docs)]
//! iugflyer - promotional flyers for Institut Universitaire La Grâce,
//! generated by Gemini image models.
//!
//! The crate turns a description, a handful of photos and a logo into one
//! instruction plus inline image parts, sends a single `generateContent`
//! call and returns the first image found in the response.
//!
//! # Quick Start
//!
//! ```no_run
//! use iugflyer::{
//!     FlyerController, FlyerDispatcher, GeminiClient, GeminiModel, Language, TextPosition,
//! };
//!
//! #[tokio::main]
//! async fn main() -> iugflyer::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let dispatcher = FlyerDispatcher::new(client, GeminiModel::NanoBanana.as_str());
//!     let form = FlyerController::new(dispatcher);
//!
//!     form.set_description("Admissions ouvertes 2025-2026, Master en Gestion");
//!     form.set_language(Language::French);
//!     form.set_text_position(TextPosition::OverlayCenter);
//!     form.add_user_files(&["campus.jpg", "students.jpg"]).await?;
//!     form.set_logo_file("logo.png").await?;
//!
//!     form.submit().await?;
//!     let path = form.download(".")?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `iugflyer` command-line front end.

pub mod controller;
pub mod encode;
mod error;
pub mod flyer;
pub mod status;

// Re-export error types at crate root
pub use error::{
    FlyerError, Result, EMPTY_DESCRIPTION_MESSAGE, GENERIC_FAILURE_MESSAGE, NO_IMAGE_MESSAGE,
};

pub use controller::{download_file_name, FlyerController, FormState};
pub use encode::{encode_file, encode_files};
pub use flyer::{
    find_first_inline_image, BackgroundPreset, ContentGenerator, FlyerDispatcher, FlyerRequest,
    GeminiClient, GeminiClientBuilder, GeminiModel, GeneratedFlyer, ImageAttachment, ImageFormat,
    Language, TextPosition,
};
pub use status::{StatusCycle, LOADING_MESSAGES};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::controller::FlyerController;
    pub use crate::error::{FlyerError, Result};
    pub use crate::flyer::{
        ContentGenerator, FlyerDispatcher, FlyerRequest, GeminiClient, GeneratedFlyer,
        ImageAttachment, Language, TextPosition,
    };
}
