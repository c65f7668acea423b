use palette::Srgb;

use crate::colorfulness::{colorfulness, colorfulness_of};
use crate::dbscan::MergedClusters;

/// A palette entry: a color, the share of the surface it covers and how
/// colorful it is on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteColor {
    pub color: Srgb<f32>,
    pub weight: f32,
    pub colorfulness: f32,
}

impl PaletteColor {
    pub fn new(color: Srgb<f32>, weight: f32) -> Self {
        Self {
            color,
            weight,
            colorfulness: colorfulness(color),
        }
    }

    pub fn to_rgb8(&self) -> Srgb<u8> {
        self.color.into_format::<u8>()
    }

    /// `RRGGBB`, uppercase, no leading `#`.
    pub fn hex(&self) -> String {
        let c = self.to_rgb8();
        format!("{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
    }
}

/// Accent colors picked from a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct AccentPalette {
    /// Most colorful cluster.
    pub primary: PaletteColor,
    pub secondary: PaletteColor,
    pub tertiary: PaletteColor,
    /// Least colorful cluster.
    pub base: PaletteColor,
    /// Cluster covering the largest share of the surface.
    pub dominant: PaletteColor,
    pub colorfulness: f32,
}

/// Every merged cluster with its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPalette {
    pub colors: Vec<PaletteColor>,
    pub colorfulness: f32,
}

impl WeightedPalette {
    /// Entries ordered by weight, heaviest first.
    pub fn by_weight(&self) -> Vec<PaletteColor> {
        let mut colors = self.colors.clone();
        colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        colors
    }
}

/// Shape of the result an analyzer publishes.
pub trait PaletteVariant {
    type Output: Clone + Send + 'static;

    /// Cluster count used when the caller does not pick one.
    const DEFAULT_CLUSTER_COUNT: usize;

    fn assemble(clusters: &MergedClusters) -> Option<Self::Output>;
}

/// Ranked accents: primary, secondary, tertiary, base and dominant.
#[derive(Debug, Clone, Copy)]
pub struct Accent;

/// The full merged set as color/weight pairs.
#[derive(Debug, Clone, Copy)]
pub struct Weighted;

impl PaletteVariant for Accent {
    type Output = AccentPalette;
    const DEFAULT_CLUSTER_COUNT: usize = 8;

    fn assemble(clusters: &MergedClusters) -> Option<AccentPalette> {
        assemble_accents(clusters)
    }
}

impl PaletteVariant for Weighted {
    type Output = WeightedPalette;
    const DEFAULT_CLUSTER_COUNT: usize = 6;

    fn assemble(clusters: &MergedClusters) -> Option<WeightedPalette> {
        assemble_weighted(clusters)
    }
}

fn palette_colors(clusters: &MergedClusters) -> Vec<PaletteColor> {
    clusters
        .centroids
        .iter()
        .zip(&clusters.weights)
        .map(|(&color, &weight)| PaletteColor::new(color, weight))
        .collect()
}

/// Rank merged clusters by colorfulness.
///
/// With fewer than three clusters the missing ranks repeat the least
/// colorful one. Returns `None` when there is nothing to rank.
pub fn assemble_accents(clusters: &MergedClusters) -> Option<AccentPalette> {
    let mut ranked = palette_colors(clusters);
    let dominant = *ranked
        .iter()
        .reduce(|best, c| if c.weight > best.weight { c } else { best })?;

    ranked.sort_by(|a, b| b.colorfulness.total_cmp(&a.colorfulness));
    let base = *ranked.last()?;
    let rank = |i: usize| ranked.get(i).copied().unwrap_or(base);

    Some(AccentPalette {
        primary: rank(0),
        secondary: rank(1),
        tertiary: rank(2),
        base,
        dominant,
        colorfulness: colorfulness_of(&clusters.centroids),
    })
}

/// Keep every merged cluster, in merge order.
pub fn assemble_weighted(clusters: &MergedClusters) -> Option<WeightedPalette> {
    if clusters.is_empty() {
        return None;
    }
    Some(WeightedPalette {
        colors: palette_colors(clusters),
        colorfulness: colorfulness_of(&clusters.centroids),
    })
}
