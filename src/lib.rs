#![warn(missing_docs)]
//! Image Weaver - prompt-to-image front-end for Google Imagen.
//!
//! The crate has two halves:
//!
//! - an image request client ([`ImageClient`]) that turns a prompt and an
//!   [`AspectRatio`] into one JPEG image or one [`GenerationError`], and
//! - a generation view ([`GenerationView`]) holding the UI state machine
//!   (idle, loading, success, failed) and rendering it as a [`Frame`].
//!
//! # Quick Start
//!
//! ```no_run
//! use imageweaver::{AspectRatio, Config, GenerationView, ImageClient, ImagenProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> imageweaver::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = ImageClient::new(Arc::new(ImagenProvider::new(&config)));
//!
//!     let mut view = GenerationView::new(client);
//!     view.set_prompt("A majestic lion wearing a crown, cinematic lighting");
//!     view.select_aspect_ratio(AspectRatio::Landscape);
//!     view.submit().await;
//!
//!     println!("{}", view.frame());
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli`: the `weaver` binary.

mod config;
mod error;
pub mod image;
pub mod session;
pub mod view;

pub use config::{Config, ConfigBuilder, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{GenerationError, Result, WeaverError, NO_IMAGE_DATA_MESSAGE};

pub use image::{
    AspectRatio, GeneratedImage, GenerationRequest, GenerationResponse, ImageClient,
    ImageProvider, ResponseImage,
};

pub use image::providers::ImagenProvider;

pub use session::{Command, Session};
pub use view::{Frame, GenerationView, Phase, ViewState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{GenerationError, Result, WeaverError};
    pub use crate::image::providers::ImagenProvider;
    pub use crate::image::{AspectRatio, GeneratedImage, ImageClient, ImageProvider};
    pub use crate::view::{Frame, GenerationView};
}
