//! Basic image generation example.
//!
//! Run with: `cargo run --example generate_image`
//!
//! Requires `API_KEY` environment variable.

use imageweaver::{AspectRatio, Config, ImageClient, ImagenProvider};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let client = ImageClient::new(Arc::new(ImagenProvider::new(&config)));

    let image = client
        .generate(
            "A golden retriever puppy playing in snow",
            AspectRatio::Landscape,
        )
        .await?;

    image.save("output.jpg")?;
    println!(
        "Generated image: {} bytes, model: {:?}",
        image.size(),
        image.model
    );

    Ok(())
}
