//! Drives the generation view once and writes the rendered frame as HTML.
//!
//! Run with: `cargo run --example render_html -- "a red fox in snow"`
//!
//! Requires `API_KEY` environment variable.

use imageweaver::{AspectRatio, Config, GenerationView, ImageClient, ImagenProvider};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "A lighthouse on a cliff at dusk, oil painting".to_string());

    let config = Config::from_env()?;
    let mut view = GenerationView::new(ImageClient::new(Arc::new(ImagenProvider::new(&config))));

    view.set_prompt(prompt);
    view.select_aspect_ratio(AspectRatio::Standard);
    println!("{}", view.frame());

    view.submit().await;
    let frame = view.frame();
    println!("{frame}");

    std::fs::write("weaver.html", frame.to_html())?;
    println!("Wrote weaver.html");

    Ok(())
}
