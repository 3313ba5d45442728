//! CLI for Image Weaver - prompt-to-image via Google Imagen.

use clap::{Args, Parser, Subcommand, ValueEnum};
use imageweaver::{
    AspectRatio, Config, GenerationView, ImageClient, ImageProvider, ImagenProvider, Session,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "weaver")]
#[command(about = "Describe an image, pick an aspect ratio, and let Imagen weave it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Interactive,

    /// Generate a single image from a text prompt
    Generate(GenerateArgs),

    /// List supported aspect ratios
    Ratios,

    /// Check that the API key and model are usable
    Check,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Aspect ratio
    #[arg(short, long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Write the image (JPEG) to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the rendered view as an HTML fragment to this path
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
    #[value(name = "4:3")]
    Standard,
    #[value(name = "3:4")]
    StandardPortrait,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Standard => AspectRatio::Standard,
            AspectRatioArg::StandardPortrait => AspectRatio::StandardPortrait,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => run_interactive(load_provider()?).await?,
        Commands::Generate(args) => generate_image(load_provider()?, args, cli.json).await?,
        Commands::Check => check(load_provider()?.as_ref(), cli.json).await?,
        Commands::Ratios => list_ratios(cli.json)?,
    }

    Ok(())
}

/// Missing credentials are fatal before anything becomes interactive.
fn load_provider() -> anyhow::Result<Arc<ImagenProvider>> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(Arc::new(ImagenProvider::new(&config)))
}

async fn run_interactive(provider: Arc<ImagenProvider>) -> anyhow::Result<()> {
    eprintln!("Image Weaver - type a description, then :go (:help for commands)");
    let view = GenerationView::new(ImageClient::new(provider));
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut session = Session::new(view, input, tokio::io::stdout());
    session.run().await?;
    Ok(())
}

async fn generate_image(
    provider: Arc<ImagenProvider>,
    args: GenerateArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut view = GenerationView::new(ImageClient::new(provider));
    view.set_prompt(args.prompt);
    view.select_aspect_ratio(args.aspect_ratio.into());
    view.submit().await;

    let frame = view.frame();
    if let Some(ref path) = args.html {
        std::fs::write(path, frame.to_html())?;
    }

    let state = view.state();
    if let (Some(image), Some(path)) = (state.image(), args.output.as_ref()) {
        image.save(path)?;
    }

    if json_output {
        let result = match (state.image(), state.error()) {
            (Some(image), _) => serde_json::json!({
                "type": "image",
                "success": true,
                "aspect_ratio": state.aspect_ratio(),
                "output": args.output.as_ref().map(|p| p.display().to_string()),
                "size_bytes": image.size(),
                "model": image.model,
                "duration_ms": image.duration_ms,
                "data_uri_len": image.data_uri().len(),
            }),
            (None, error) => serde_json::json!({
                "type": "image",
                "success": false,
                "error": error,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{frame}");
        if let (Some(image), Some(path)) = (state.image(), args.output.as_ref()) {
            println!("Saved image: {} ({} bytes)", path.display(), image.size());
        }
        if let Some(duration) = state.image().and_then(|i| i.duration_ms) {
            println!("Duration: {}ms", duration);
        }
    }

    if let Some(message) = frame.banner {
        anyhow::bail!(message);
    }
    Ok(())
}

async fn check(provider: &dyn ImageProvider, json_output: bool) -> anyhow::Result<()> {
    let result = provider.health_check().await;
    if json_output {
        let value = serde_json::json!({
            "provider": provider.name(),
            "ok": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match &result {
            Ok(()) => println!("✓ {} is reachable", provider.name()),
            Err(e) => println!("✗ {}: {e}", provider.name()),
        }
    }
    result?;
    Ok(())
}

fn list_ratios(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&AspectRatio::ALL)?);
    } else {
        println!("Supported aspect ratios:");
        for (i, ratio) in AspectRatio::ALL.iter().enumerate() {
            let default = if i == 0 { " (default)" } else { "" };
            println!("  {ratio}{default}");
        }
    }
    Ok(())
}
