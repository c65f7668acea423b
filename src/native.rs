use crate::analyzer::{AccentAnalyzer, AnalyzerConfig, ColorPaletteSampler};
use crate::assemble::{AccentPalette, WeightedPalette};
use crate::error::Result;

/// Decode an encoded image and pick its accent colors.
///
/// `Ok(None)` when the image holds no opaque pixels.
pub fn analyze_accents_bytes(
    input: &[u8],
    config: &AnalyzerConfig,
) -> Result<Option<AccentPalette>> {
    let img = image::load_from_memory(input)?;
    AccentAnalyzer::new(config.clone()).analyze(&img)
}

/// Decode an encoded image and extract its weighted palette.
pub fn sample_palette_bytes(
    input: &[u8],
    config: &AnalyzerConfig,
) -> Result<Option<WeightedPalette>> {
    let img = image::load_from_memory(input)?;
    ColorPaletteSampler::new(config.clone()).analyze(&img)
}
