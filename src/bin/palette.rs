use accent_palette_wasm::{
    AccentAnalyzer, AccentPalette, AnalyzerConfig, ColorPaletteSampler, PaletteColor,
    WeightedPalette,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Primary, secondary, tertiary, base and dominant colors
    Accent,
    /// Every merged cluster with its coverage
    Weighted,
}

/// Extract accent colors or a weighted palette from images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// What to extract
    #[arg(short, long, value_enum, default_value_t = Mode::Accent)]
    mode: Mode,

    /// Number of k-means clusters (defaults to 8 for accent, 6 for weighted)
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Approximate number of pixels sampled per image
    #[arg(short, long, default_value_t = accent_palette_wasm::DEFAULT_SAMPLE_COUNT)]
    samples: u32,

    /// Distance under which cluster centroids are merged (normalized RGB)
    #[arg(short, long, default_value_t = accent_palette_wasm::DEFAULT_MERGE_DISTANCE)]
    epsilon: f32,

    /// Seed the initial cluster assignment for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn color_json(color: &PaletteColor) -> Value {
    json!({
        "hex": color.hex(),
        "weight": color.weight,
        "colorfulness": color.colorfulness,
    })
}

fn accent_json(accents: &AccentPalette) -> Value {
    json!({
        "primary": color_json(&accents.primary),
        "secondary": color_json(&accents.secondary),
        "tertiary": color_json(&accents.tertiary),
        "base": color_json(&accents.base),
        "dominant": color_json(&accents.dominant),
        "colorfulness": accents.colorfulness,
    })
}

fn weighted_json(palette: &WeightedPalette) -> Value {
    json!({
        "colors": palette.colors.iter().map(color_json).collect::<Vec<_>>(),
        "colorfulness": palette.colorfulness,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let base = match args.mode {
        Mode::Accent => AnalyzerConfig::for_variant::<accent_palette_wasm::Accent>(),
        Mode::Weighted => AnalyzerConfig::for_variant::<accent_palette_wasm::Weighted>(),
    };
    let clusters = args.clusters.unwrap_or(base.cluster_count);
    let config = base
        .with_cluster_count(clusters)
        .with_sample_count(args.samples)
        .with_merge_distance(args.epsilon);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let accents = AccentAnalyzer::new(config.clone());
    let sampler = ColorPaletteSampler::new(config);

    for input in &args.inputs {
        let img = image::open(input)
            .with_context(|| format!("unable to open {}", input.display()))?;

        let palette = match args.mode {
            Mode::Accent => accents
                .analyze_with_rng(&img, &mut rng)?
                .map(|a| accent_json(&a)),
            Mode::Weighted => sampler
                .analyze_with_rng(&img, &mut rng)?
                .map(|p| weighted_json(&p)),
        };

        let doc = json!({
            "file": input.display().to_string(),
            "palette": palette.unwrap_or(Value::Null),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }

    Ok(())
}
