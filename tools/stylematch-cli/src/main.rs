//! Stylematch command line tool
//!
//! Builds a catalog index from `<catalog>/<product_id>/` images and matches
//! detection crops under `<crops>/<video_id>/` against it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use stylematch::{
    BuildConfig, ClipEmbedder, EmbedderConfig, MatchConfig, MatchThresholds, build_index,
    load_catalog, run_match_job,
};
use tracing::{Level, info, warn};

/// Default results file name inside the crops directory
const RESULTS_FILE: &str = "match_results.json";

/// Default model directory
fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stylematch")
        .join("models")
        .join("clip-vit-base-patch32")
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "stylematch")]
#[command(about = "Match video detection crops against a product catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the CLIP `model.safetensors`
    #[arg(short, long, env = "STYLEMATCH_MODEL_DIR", global = true)]
    model_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed every catalog image and write the index
    BuildIndex {
        /// Catalog root with one directory per product
        #[arg(short, long, env = "STYLEMATCH_CATALOG_DIR")]
        catalog: PathBuf,

        /// Directory to write the index into
        #[arg(short, long, env = "STYLEMATCH_INDEX_DIR")]
        output: PathBuf,

        /// Embed images on all cores
        #[arg(short, long)]
        parallel: bool,
    },
    /// Match every crop against a built index
    Match {
        /// Crops root with one directory per video
        #[arg(short, long, env = "STYLEMATCH_CROPS_DIR")]
        crops: PathBuf,

        /// Directory holding the index
        #[arg(short, long, env = "STYLEMATCH_INDEX_DIR")]
        index: PathBuf,

        /// Results file (defaults to `<crops>/match_results.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scores above this are exact matches
        #[arg(long, env = "STYLEMATCH_EXACT_THRESHOLD")]
        exact_threshold: Option<f32>,

        /// Scores above this are similar matches
        #[arg(long, env = "STYLEMATCH_SIMILAR_THRESHOLD")]
        similar_threshold: Option<f32>,
    },
    /// Show what a built index contains
    Inspect {
        /// Directory holding the index
        #[arg(short, long, env = "STYLEMATCH_INDEX_DIR")]
        index: PathBuf,
    },
}

fn load_embedder(model_dir: Option<PathBuf>) -> Result<ClipEmbedder> {
    let model_dir = model_dir.unwrap_or_else(default_model_dir);
    if !model_dir.is_dir() {
        bail!(
            "model directory {} does not exist; place the clip-vit-base-patch32 \
             model.safetensors there or pass --model-dir",
            model_dir.display()
        );
    }
    info!("Loading CLIP model from {}", model_dir.display());
    ClipEmbedder::load(&EmbedderConfig::new(&model_dir))
        .with_context(|| format!("failed to load model from {}", model_dir.display()))
}

fn thresholds(exact: Option<f32>, similar: Option<f32>) -> Result<MatchThresholds> {
    let defaults = MatchThresholds::default();
    MatchThresholds::new(
        exact.unwrap_or(defaults.exact),
        similar.unwrap_or(defaults.similar),
    )
    .context("invalid match thresholds")
}

fn results_path(crops: &Path, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| crops.join(RESULTS_FILE))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::BuildIndex {
            catalog,
            output,
            parallel,
        } => {
            let embedder = load_embedder(cli.model_dir)?;
            let config = BuildConfig::default().with_parallel(parallel);
            let summary = build_index(&embedder, &catalog, &output, &config)
                .with_context(|| format!("failed to build index from {}", catalog.display()))?;

            for skipped in &summary.skipped_images {
                warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
            }
            println!(
                "Indexed {} images across {} products ({} skipped) into {}",
                summary.indexed,
                summary.products,
                summary.skipped,
                output.display()
            );
        }
        Commands::Match {
            crops,
            index,
            output,
            exact_threshold,
            similar_threshold,
        } => {
            let config = MatchConfig::default()
                .with_thresholds(thresholds(exact_threshold, similar_threshold)?);
            let output = results_path(&crops, output);
            let embedder = load_embedder(cli.model_dir)?;

            let summary = run_match_job(&embedder, &crops, &index, &output, &config)
                .with_context(|| format!("failed to match crops in {}", crops.display()))?;
            println!(
                "Matched {} crops: {} exact, {} similar, {} no match ({} skipped)",
                summary.matched, summary.exact, summary.similar, summary.no_match, summary.skipped
            );
            println!("Results written to {}", output.display());
        }
        Commands::Inspect { index } => {
            let catalog = load_catalog(&index)
                .with_context(|| format!("failed to load index from {}", index.display()))?;
            println!("Index:      {}", index.display());
            println!("Model:      {}", catalog.model());
            println!("Vectors:    {}", catalog.len());
            println!("Dimension:  {}", catalog.index().dimension());
            println!("Products:   {}", catalog.product_count());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_model_dir_names_the_model() {
        assert!(default_model_dir().ends_with("stylematch/models/clip-vit-base-patch32"));
    }

    #[test]
    fn results_default_to_crops_root() {
        assert_eq!(
            results_path(Path::new("crops"), None),
            PathBuf::from("crops/match_results.json")
        );
        assert_eq!(
            results_path(Path::new("crops"), Some(PathBuf::from("out.json"))),
            PathBuf::from("out.json")
        );
    }

    #[test]
    fn thresholds_fall_back_to_defaults() {
        let t = thresholds(None, None).unwrap();
        assert_eq!(t, MatchThresholds::default());

        let t = thresholds(Some(0.95), None).unwrap();
        assert_eq!(t.exact, 0.95);
        assert_eq!(t.similar, MatchThresholds::default().similar);

        assert!(thresholds(Some(0.5), Some(0.8)).is_err());
    }

    #[test]
    fn parses_match_subcommand() {
        let cli = Cli::try_parse_from([
            "stylematch",
            "match",
            "--crops",
            "crops",
            "--index",
            "store",
            "--exact-threshold",
            "0.92",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Match {
                crops,
                exact_threshold,
                output,
                ..
            } => {
                assert_eq!(crops, PathBuf::from("crops"));
                assert_eq!(exact_threshold, Some(0.92));
                assert!(output.is_none());
            }
            _ => panic!("expected match subcommand"),
        }
    }
}
