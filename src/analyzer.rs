//! Sample a surface, cluster its colors and publish a palette.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use palette::Srgb;
use rand::Rng;
use tracing::{debug, info_span};

use crate::assemble::{Accent, PaletteVariant, Weighted};
use crate::dbscan::{self, DEFAULT_MERGE_DISTANCE, MergedClusters};
use crate::error::{PaletteError, Result};
use crate::kmeans::{self, DEFAULT_MAX_ITERATIONS};
use crate::sampler::{DEFAULT_SAMPLE_COUNT, Surface, sample_pixels};

/// Picks the five accent colors of a surface.
pub type AccentAnalyzer = Analyzer<Accent>;

/// Extracts a weighted palette from a surface.
pub type ColorPaletteSampler = Analyzer<Weighted>;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Approximate number of pixels sampled from the surface.
    pub sample_count: u32,
    /// Number of k-means clusters before merging.
    pub cluster_count: usize,
    /// DBSCAN radius used to fuse near-identical centroids.
    pub merge_distance: f32,
    /// DBSCAN core-point threshold. Zero keeps isolated centroids.
    pub min_points: usize,
    pub max_iterations: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::for_variant::<Accent>()
    }
}

impl AnalyzerConfig {
    pub fn for_variant<V: PaletteVariant>() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            cluster_count: V::DEFAULT_CLUSTER_COUNT,
            merge_distance: DEFAULT_MERGE_DISTANCE,
            min_points: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_cluster_count(mut self, cluster_count: usize) -> Self {
        self.cluster_count = cluster_count;
        self
    }

    pub fn with_merge_distance(mut self, merge_distance: f32) -> Self {
        self.merge_distance = merge_distance;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.cluster_count == 0 {
            return Err(PaletteError::InvalidArgument(
                "cluster count must be at least 1".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PaletteError::InvalidArgument(
                "max iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Run k-means over `samples`, then merge centroids closer than the configured
/// merge distance.
pub fn cluster_samples<R: Rng + ?Sized>(
    samples: &[Srgb<f32>],
    config: &AnalyzerConfig,
    rng: &mut R,
) -> Result<MergedClusters> {
    let clusters =
        kmeans::kmeans_capped(samples, config.cluster_count, config.max_iterations, rng)?;
    dbscan::merge(
        &clusters.centroids,
        &clusters.weights(),
        config.merge_distance,
        config.min_points,
    )
}

/// Clears the in-progress flag when the analysis finishes, even on error.
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| PaletteError::AnalysisInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Runs one analysis at a time and keeps the last palette it produced.
pub struct Analyzer<V: PaletteVariant> {
    config: AnalyzerConfig,
    in_progress: AtomicBool,
    latest: Mutex<Option<V::Output>>,
    listener: Option<Listener<V::Output>>,
}

impl<V: PaletteVariant> Default for Analyzer<V> {
    fn default() -> Self {
        Self::new(AnalyzerConfig::for_variant::<V>())
    }
}

impl<V: PaletteVariant> Analyzer<V> {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            in_progress: AtomicBool::new(false),
            latest: Mutex::new(None),
            listener: None,
        }
    }

    /// Register a callback invoked once for every palette this analyzer
    /// publishes.
    pub fn on_update(mut self, listener: impl Fn(&V::Output) + Send + Sync + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Last palette published, if any.
    pub fn latest(&self) -> Option<V::Output> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn analyze<S: Surface + ?Sized>(&self, surface: &S) -> Result<Option<V::Output>> {
        self.analyze_with_rng(surface, &mut rand::rng())
    }

    /// Sample `surface`, cluster it and publish the resulting palette.
    ///
    /// `Ok(None)` means the surface had no usable pixels; the previously
    /// published palette is left as it was. Calling this while another
    /// analysis runs on the same analyzer fails with
    /// [`PaletteError::AnalysisInProgress`].
    pub fn analyze_with_rng<S: Surface + ?Sized, R: Rng + ?Sized>(
        &self,
        surface: &S,
        rng: &mut R,
    ) -> Result<Option<V::Output>> {
        let _guard = InProgress::acquire(&self.in_progress)?;
        self.config.validate()?;

        let span = info_span!("analyze", clusters = self.config.cluster_count);
        let _enter = span.enter();

        let samples = sample_pixels(surface, self.config.sample_count);
        if samples.is_empty() {
            debug!("no samples, keeping previous palette");
            return Ok(None);
        }

        let merged = cluster_samples(&samples, &self.config, rng)?;
        let Some(output) = V::assemble(&merged) else {
            return Ok(None);
        };
        debug!(samples = samples.len(), colors = merged.len(), "palette updated");

        *self
            .latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(output.clone());
        if let Some(listener) = &self.listener {
            listener(&output);
        }
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn split_image() -> RgbaImage {
        // Width deliberately not a multiple of the cluster count so the
        // round-robin start does not give every cluster the same members.
        RgbaImage::from_fn(61, 67, |x, _| {
            if x < 46 {
                Rgba([30, 30, 30, 255])
            } else {
                Rgba([230, 40, 40, 255])
            }
        })
    }

    /// Surface that tries to start a second analysis while being rendered.
    struct Reentrant<'a> {
        analyzer: &'a AccentAnalyzer,
        inner: RgbaImage,
        nested: RefCell<Option<Result<Option<crate::AccentPalette>>>>,
    }

    impl Surface for Reentrant<'_> {
        fn dimensions(&self) -> (u32, u32) {
            (self.inner.width(), self.inner.height())
        }

        fn render(&self, width: u32, height: u32) -> Option<Vec<u8>> {
            *self.nested.borrow_mut() = Some(self.analyzer.analyze(&self.inner));
            self.inner.render(width, height)
        }
    }

    #[test]
    fn default_configs_follow_variant() {
        assert_eq!(AccentAnalyzer::default().config().cluster_count, 8);
        assert_eq!(ColorPaletteSampler::default().config().cluster_count, 6);
        assert_eq!(AnalyzerConfig::default().sample_count, 4096);
    }

    #[test]
    fn accents_pick_vivid_primary_and_large_dominant() {
        let analyzer = AccentAnalyzer::default();
        let mut rng = StdRng::seed_from_u64(7);
        let accents = analyzer
            .analyze_with_rng(&split_image(), &mut rng)
            .unwrap()
            .unwrap();

        assert!(accents.primary.color.red > 0.8);
        assert!(accents.dominant.color.red < 0.2);
        assert!(accents.dominant.weight > 0.7);
        assert_eq!(analyzer.latest(), Some(accents));
    }

    #[test]
    fn empty_surface_keeps_previous_palette() {
        let analyzer = ColorPaletteSampler::default();
        let mut rng = StdRng::seed_from_u64(1);
        let first = analyzer
            .analyze_with_rng(&split_image(), &mut rng)
            .unwrap()
            .unwrap();

        let transparent = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        assert!(analyzer.analyze_with_rng(&transparent, &mut rng).unwrap().is_none());
        assert_eq!(analyzer.latest(), Some(first));
    }

    #[test]
    fn listener_fires_once_per_published_palette() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let analyzer = ColorPaletteSampler::default().on_update(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        analyzer.analyze(&split_image()).unwrap();
        analyzer.analyze(&None::<RgbaImage>).unwrap();
        analyzer.analyze(&split_image()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reentrant_analysis_is_refused() {
        let analyzer = AccentAnalyzer::default();
        let surface = Reentrant {
            analyzer: &analyzer,
            inner: split_image(),
            nested: RefCell::new(None),
        };

        assert!(analyzer.analyze(&surface).unwrap().is_some());
        assert!(matches!(
            surface.nested.borrow_mut().take(),
            Some(Err(PaletteError::AnalysisInProgress))
        ));
        assert!(!analyzer.is_busy());
    }

    #[test]
    fn invalid_cluster_count_fails_fast() {
        let analyzer = AccentAnalyzer::new(AnalyzerConfig::default().with_cluster_count(0));
        assert!(matches!(
            analyzer.analyze(&split_image()),
            Err(PaletteError::InvalidArgument(_))
        ));
        assert!(!analyzer.is_busy());
    }
}
