use std::path::PathBuf;

use anyhow::Context;
use billshield_core::PipelineConfig;
use billshield_ocr::{BatchCoordinator, BillProcessor, ImageFetcher, RecognitionAdapter};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Command;

const USAGE: &str = "Usage: billshield <image_path_or_url> [redacted_output.png]
       billshield --story <story.json>";

/// Points at an optional TOML file with pipeline settings.
const CONFIG_ENV: &str = "BILLSHIELD_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only results.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = Command::parse(&args) else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            PipelineConfig::load(&path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    // ── Pipeline wiring ───────────────────────────────────────────────────────
    // Built once here and lent to the batch coordinator.
    let recognizer = RecognitionAdapter::detect(&config.recognition);
    if !recognizer.is_available() {
        tracing::warn!("No OCR engine available; results will be empty");
    }
    let processor = BillProcessor::new(recognizer, &config);
    let fetcher = ImageFetcher::new(&config.fetch).context("building HTTP client")?;
    let batch = BatchCoordinator::new(&processor, &fetcher);

    let output = match command {
        Command::Image { source, output } => {
            commands::run_image(&batch, &source, output.as_deref()).await?
        }
        Command::Story { path } => commands::run_story(&batch, &path).await?,
    };

    print!("{output}");
    Ok(())
}
