//! Image generation providers.

mod imagen;

pub use imagen::ImagenProvider;
