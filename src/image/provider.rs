//! Image provider trait.

use crate::error::Result;
use crate::image::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;

/// Trait for the remote image generation service.
///
/// Implementations issue exactly one outbound call per `generate` and
/// never retry.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Requests one JPEG image for the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;

    /// Checks if the provider is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
