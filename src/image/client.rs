//! The image request client: one call in, one image or one error out.

use crate::error::{GenerationError, WeaverError};
use crate::image::provider::ImageProvider;
use crate::image::types::{AspectRatio, GeneratedImage, GenerationRequest};
use std::sync::Arc;

/// Wraps an [`ImageProvider`] and classifies every outcome into either a
/// [`GeneratedImage`] or a [`GenerationError`].
#[derive(Clone)]
pub struct ImageClient {
    provider: Arc<dyn ImageProvider>,
}

impl std::fmt::Debug for ImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClient")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl ImageClient {
    /// Creates a client over the given provider.
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &dyn ImageProvider {
        self.provider.as_ref()
    }

    /// Generates one image. The prompt is passed through untouched.
    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage, GenerationError> {
        let request = GenerationRequest::new(prompt).with_aspect_ratio(aspect_ratio);
        self.generate_request(&request).await
    }

    /// Generates one image from an already captured request.
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        tracing::debug!(
            provider = self.provider.name(),
            aspect_ratio = %request.aspect_ratio,
            prompt_len = request.prompt.len(),
            "requesting image"
        );

        let outcome = match self.provider.generate(request).await {
            Ok(response) => {
                let filtered = response.filtered_reason().map(str::to_string);
                response.first_image().ok_or_else(|| {
                    if let Some(reason) = filtered {
                        tracing::debug!(%reason, "prediction filtered by the service");
                    }
                    WeaverError::NoImageData
                })
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(image) => {
                tracing::debug!(
                    size_bytes = image.size(),
                    duration_ms = image.duration_ms,
                    "image received"
                );
                Ok(image)
            }
            Err(e) => {
                tracing::error!("error generating image: {e}");
                Err(GenerationError::from_service(e))
            }
        }
    }
}
