//! Core types for image generation.

use crate::error::{Result, WeaverError};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// MIME type every generated image is requested and rendered as.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Supported aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape (widescreen) aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (tall) aspect ratio.
    #[serde(rename = "9:16")]
    Portrait,
    /// 4:3 standard landscape aspect ratio.
    #[serde(rename = "4:3")]
    Standard,
    /// 3:4 standard portrait aspect ratio.
    #[serde(rename = "3:4")]
    StandardPortrait,
}

impl AspectRatio {
    /// Every supported ratio, in display order.
    pub const ALL: [AspectRatio; 5] = [
        Self::Square,
        Self::Landscape,
        Self::Portrait,
        Self::Standard,
        Self::StandardPortrait,
    ];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::StandardPortrait => "3:4",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = WeaverError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == token)
            .ok_or_else(|| {
                WeaverError::InvalidRequest(format!(
                    "unsupported aspect ratio '{token}' (expected one of 1:1, 16:9, 9:16, 4:3, 3:4)"
                ))
            })
    }
}

/// A request to generate one image, captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt, sent exactly as entered.
    pub prompt: String,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt and the default ratio.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }
}

/// A generated image as returned by the service: base64 text, always JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generated image should be saved or rendered"]
pub struct GeneratedImage {
    data: String,
    /// Model that produced the image.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

impl GeneratedImage {
    /// Wraps a base64 payload as returned by the service.
    pub fn from_base64(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            model: None,
            duration_ms: None,
        }
    }

    /// Attaches generation metadata.
    pub fn with_metadata(mut self, model: impl Into<String>, duration_ms: u64) -> Self {
        self.model = Some(model.into());
        self.duration_ms = Some(duration_ms);
        self
    }

    /// The base64 payload, verbatim.
    pub fn base64(&self) -> &str {
        &self.data
    }

    /// Returns the image as a `data:image/jpeg;base64,...` URI.
    pub fn data_uri(&self) -> String {
        format!("data:{JPEG_MIME_TYPE};base64,{}", self.data)
    }

    /// Decodes the payload into raw JPEG bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| WeaverError::Decode(e.to_string()))
    }

    /// Size of the decoded image in bytes (estimated from the payload).
    pub fn size(&self) -> usize {
        let payload = self.data.trim();
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        ((payload.len() / 4) * 3).saturating_sub(padding.min(2))
    }

    /// Decodes and writes the image to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}

/// One entry of a service response. The payload may be absent, e.g. when
/// the image was filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseImage {
    /// Base64 image payload.
    pub image_bytes: Option<String>,
    /// Why the service withheld the payload, when it says.
    pub filtered_reason: Option<String>,
}

impl ResponseImage {
    /// An entry carrying a payload.
    pub fn with_bytes(data: impl Into<String>) -> Self {
        Self {
            image_bytes: Some(data.into()),
            filtered_reason: None,
        }
    }
}

/// Raw outcome of one remote call, before the client interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Generated images, in service order.
    pub generated_images: Vec<ResponseImage>,
    /// Model that served the call.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

impl GenerationResponse {
    /// Why the service withheld the first image, if it said.
    pub fn filtered_reason(&self) -> Option<&str> {
        self.generated_images
            .first()
            .and_then(|image| image.filtered_reason.as_deref())
    }

    /// Returns the first image with a non-empty payload, if any.
    pub fn first_image(self) -> Option<GeneratedImage> {
        let data = self
            .generated_images
            .into_iter()
            .next()?
            .image_bytes
            .filter(|b| !b.is_empty())?;
        let mut image = GeneratedImage::from_base64(data);
        image.model = self.model;
        image.duration_ms = self.duration_ms;
        Some(image)
    }
}
