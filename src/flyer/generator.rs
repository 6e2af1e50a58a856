//! Remote generation capability.

use crate::error::Result;
use crate::flyer::content::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// A service that answers `generateContent` calls.
///
/// Implementations perform exactly one remote call per invocation and
/// return transport failures unmodified.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Sends `request` to `model` and returns the raw response.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Returns the name of this generator for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ContentGenerator + ?Sized> ContentGenerator for Arc<T> {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        (**self).generate_content(model, request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
