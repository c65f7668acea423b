//! Accent and palette extraction for rendered surfaces.
//!
//! A surface is sampled down to a few thousand pixels, the samples are
//! clustered with k-means, near-duplicate centroids are fused with a weighted
//! DBSCAN pass and the survivors are ranked by colorfulness.

pub mod analyzer;
pub mod assemble;
pub mod colorfulness;
pub mod dbscan;
pub mod error;
pub mod kmeans;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
pub mod sampler;
pub mod wasm;

pub use analyzer::{AccentAnalyzer, Analyzer, AnalyzerConfig, ColorPaletteSampler, cluster_samples};
pub use assemble::{
    Accent, AccentPalette, PaletteColor, PaletteVariant, Weighted, WeightedPalette,
    assemble_accents, assemble_weighted,
};
pub use colorfulness::{colorfulness, colorfulness_of};
pub use dbscan::{DEFAULT_MERGE_DISTANCE, MergedClusters, merge};
pub use error::PaletteError;
pub use kmeans::{DEFAULT_MAX_ITERATIONS, KMeansResult, kmeans, kmeans_capped};
#[cfg(not(target_arch = "wasm32"))]
pub use native::{analyze_accents_bytes, sample_palette_bytes};
pub use sampler::{DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT, Surface, sample_pixels, target_size};
