// Species Hierarchy Generator
//
// Purpose: Classify the post archive and write the species index, per-group
// files and the low-confidence review sheet
// Usage: cargo run --release --bin generate_species_hierarchy -- --input posts.json

use clap::Parser;
use species_hierarchy::config::{DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use species_hierarchy::extract::DEFAULT_MARKER;
use species_hierarchy::PipelineConfig;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Platycerium species hierarchy generator
#[derive(Parser, Debug)]
#[command(name = "generate_species_hierarchy")]
#[command(about = "Classify posts by species and variety and write the hierarchy index")]
struct Args {
    /// Post archive (`{ "posts": [...] }`)
    #[arg(long, env = "SPECIES_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory receiving the index, `species/` and the review CSV
    #[arg(long, env = "SPECIES_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Variety dictionary JSON replacing the built-in table
    #[arg(long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Substring identifying self-tracking hashtags
    #[arg(long, default_value = DEFAULT_MARKER)]
    marker: String,
}

impl From<Args> for PipelineConfig {
    fn from(args: Args) -> Self {
        Self {
            input: args.input,
            output_dir: args.output_dir,
            dictionary: args.dictionary,
            marker: args.marker,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Default log level: info for our crate, warn for others
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "species_hierarchy=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PipelineConfig::from(Args::parse());
    tracing::info!("Configuration:");
    tracing::info!("  input: {:?}", config.input);
    tracing::info!("  output_dir: {:?}", config.output_dir);
    tracing::info!(
        "  dictionary: {}",
        config
            .dictionary
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );
    tracing::info!("  marker: {}", config.marker);

    let start = Instant::now();
    let summary = species_hierarchy::run(&config)?;

    println!("\n{}", summary);
    println!("\nCompleted in {:.2?}", start.elapsed());
    Ok(())
}
