//! Image generation module.

mod client;
mod provider;
pub mod providers;
mod types;

#[cfg(test)]
pub(crate) use client::testing;

pub use client::ImageClient;
pub use provider::ImageProvider;
pub use types::{
    AspectRatio, GeneratedImage, GenerationRequest, GenerationResponse, ResponseImage,
    JPEG_MIME_TYPE,
};
