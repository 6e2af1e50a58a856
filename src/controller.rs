//! Form state and the submit / discard / download actions.

use crate::encode::encode_files;
use crate::error::{FlyerError, Result, EMPTY_DESCRIPTION_MESSAGE};
use crate::flyer::{
    BackgroundPreset, ContentGenerator, FlyerDispatcher, FlyerRequest, GeneratedFlyer,
    ImageAttachment, Language, TextPosition,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Prefix of downloaded flyer files.
pub const DOWNLOAD_PREFIX: &str = "IUG_Flyer_";

/// Returns the download file name for a unix timestamp in milliseconds.
pub fn download_file_name(timestamp_ms: i64) -> String {
    format!("{}{}.png", DOWNLOAD_PREFIX, timestamp_ms)
}

/// Everything the user has entered, plus the last outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    /// Free-text theme.
    pub description: String,
    /// Output language.
    pub language: Language,
    /// Background color description.
    pub background_color: String,
    /// Text placement.
    pub text_position: TextPosition,
    /// Extra phone numbers.
    pub extra_phones: String,
    /// User photos in selection order.
    pub user_images: Vec<ImageAttachment>,
    /// Official logo.
    pub logo: Option<ImageAttachment>,
    /// Most recent successful flyer.
    pub generated: Option<GeneratedFlyer>,
    /// Message of the last failure.
    pub error: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            description: String::new(),
            language: Language::default(),
            background_color: BackgroundPreset::default().colors().to_string(),
            text_position: TextPosition::default(),
            extra_phones: String::new(),
            user_images: Vec::new(),
            logo: None,
            generated: None,
            error: None,
        }
    }
}

impl FormState {
    /// Builds the request a submission would send right now.
    pub fn to_request(&self) -> FlyerRequest {
        FlyerRequest {
            description: self.description.clone(),
            language: self.language,
            background_color: self.background_color.clone(),
            text_position: self.text_position,
            extra_phones: self.extra_phones.clone(),
            user_images: self.user_images.clone(),
            logo: self.logo.clone(),
        }
    }
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the form state and drives submissions through a dispatcher.
///
/// All mutation goes through the named update methods. Only one
/// submission may be outstanding at a time.
pub struct FlyerController<G> {
    dispatcher: FlyerDispatcher<G>,
    state: Mutex<FormState>,
    in_flight: AtomicBool,
}

impl<G: ContentGenerator> FlyerController<G> {
    /// Creates a controller with an empty form.
    pub fn new(dispatcher: FlyerDispatcher<G>) -> Self {
        Self {
            dispatcher,
            state: Mutex::new(FormState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &FlyerDispatcher<G> {
        &self.dispatcher
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> FormState {
        self.state().clone()
    }

    /// Returns true while a submission is outstanding.
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Data URL of the current flyer, if any.
    pub fn preview(&self) -> Option<String> {
        self.state()
            .generated
            .as_ref()
            .map(|f| f.data_url().to_string())
    }

    /// Message of the last failure, if any.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Overwrites the description.
    pub fn set_description(&self, description: impl Into<String>) {
        self.state().description = description.into();
    }

    /// Sets the output language.
    pub fn set_language(&self, language: Language) {
        self.state().language = language;
    }

    /// Overwrites the background color description.
    pub fn set_background_color(&self, colors: impl Into<String>) {
        self.state().background_color = colors.into();
    }

    /// Fills the background color from a preset.
    pub fn apply_preset(&self, preset: BackgroundPreset) {
        self.set_background_color(preset.colors());
    }

    /// Sets the text placement.
    pub fn set_text_position(&self, position: TextPosition) {
        self.state().text_position = position;
    }

    /// Overwrites the extra phone numbers.
    pub fn set_extra_phones(&self, phones: impl Into<String>) {
        self.state().extra_phones = phones.into();
    }

    /// Appends images after the ones already attached.
    pub fn add_user_images(&self, images: impl IntoIterator<Item = ImageAttachment>) {
        self.state().user_images.extend(images);
    }

    /// Encodes `paths` and appends them in order.
    pub async fn add_user_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<usize> {
        let images = encode_files(paths).await?;
        let count = images.len();
        self.add_user_images(images);
        Ok(count)
    }

    /// Removes the image at `index`, keeping the others in order.
    pub fn remove_user_image(&self, index: usize) -> Option<ImageAttachment> {
        let mut state = self.state();
        if index < state.user_images.len() {
            Some(state.user_images.remove(index))
        } else {
            None
        }
    }

    /// Replaces the logo.
    pub fn set_logo(&self, logo: ImageAttachment) {
        self.state().logo = Some(logo);
    }

    /// Encodes `path` and uses it as the logo.
    pub async fn set_logo_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let logo = crate::encode::encode_file(path).await?;
        self.set_logo(logo);
        Ok(())
    }

    /// Removes the logo.
    pub fn clear_logo(&self) {
        self.state().logo = None;
    }

    /// Drops the current flyer; every other field is kept.
    pub fn discard_result(&self) {
        self.state().generated = None;
    }

    /// Validates the form and generates a flyer from it.
    ///
    /// A blank description fails without a remote call. A second call while
    /// one is outstanding fails with [`FlyerError::Busy`] and changes nothing.
    /// On failure the previous flyer stays in place.
    pub async fn submit(&self) -> Result<GeneratedFlyer> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            return Err(FlyerError::Busy);
        };

        let request = {
            let mut state = self.state();
            if state.description.trim().is_empty() {
                let err = FlyerError::Validation(EMPTY_DESCRIPTION_MESSAGE.to_string());
                state.error = Some(err.user_message());
                return Err(err);
            }
            state.error = None;
            state.to_request()
        };

        let result = self.dispatcher.generate(&request).await;

        let mut state = self.state();
        match &result {
            Ok(flyer) => {
                state.generated = Some(flyer.clone());
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "flyer generation failed");
                state.error = Some(e.user_message());
            }
        }
        result
    }

    /// Writes the current flyer into `dir` and returns the file path.
    pub fn download(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let flyer = self.state().generated.clone().ok_or(FlyerError::NoResult)?;
        let path = dir
            .as_ref()
            .join(download_file_name(chrono::Utc::now().timestamp_millis()));
        flyer.save(&path)?;
        tracing::info!(path = %path.display(), "flyer downloaded");
        Ok(path)
    }
}
