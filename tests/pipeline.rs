use accent_palette_wasm::{
    AccentAnalyzer, AnalyzerConfig, ColorPaletteSampler, PaletteError, colorfulness,
    cluster_samples, kmeans, merge, sample_pixels,
};
use image::{Rgba, RgbaImage};
use palette::Srgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_colors(rng: &mut StdRng, n: usize) -> Vec<Srgb<f32>> {
    (0..n)
        .map(|_| Srgb::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()))
        .collect()
}

#[test]
fn primaries_split_into_two_clusters() {
    let points = [
        Srgb::new(1.0, 0.0, 0.0),
        Srgb::new(1.0, 0.0, 0.0),
        Srgb::new(0.0, 1.0, 0.0),
        Srgb::new(0.0, 0.0, 1.0),
    ];

    for seed in 0..16 {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = kmeans(&points, 2, &mut rng).unwrap();

        assert!(!result.is_empty() && result.len() <= 2);
        assert!(result.counts.iter().all(|&c| c > 0));
        assert_eq!(result.counts.iter().sum::<usize>(), 4);
        assert!(result.centroids.iter().any(|c| c.red >= 0.5));
        let total: f32 = result.weights().iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }
}

#[test]
fn repeated_color_collapses_to_one_centroid() {
    let color = Srgb::new(0.8, 0.3, 0.1);
    let points = vec![color; 1000];
    let mut rng = StdRng::seed_from_u64(42);

    let result = kmeans(&points, 6, &mut rng).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.counts, vec![1000]);

    let centroid = result.centroids[0];
    assert!((centroid.red - 0.8).abs() < 1e-4);
    assert!((centroid.green - 0.3).abs() < 1e-4);
    assert!((centroid.blue - 0.1).abs() < 1e-4);

    // rg = 0.5, yb = 0.45
    let expected = 0.3 * (0.5f32 * 0.5 + 0.45 * 0.45).sqrt();
    assert!((colorfulness(centroid) - expected).abs() < 1e-4);
}

#[test]
fn near_centroids_merge_into_weighted_average() {
    let points = [Srgb::new(0.2, 0.6, 0.4), Srgb::new(0.25, 0.6, 0.4)];
    let merged = merge(&points, &[0.6, 0.4], 0.1, 0).unwrap();

    assert_eq!(merged.len(), 1);
    assert!((merged.centroids[0].red - 0.22).abs() < 1e-6);
    assert!((merged.centroids[0].green - 0.6).abs() < 1e-6);
    assert!((merged.weights[0] - 1.0).abs() < 1e-6);
}

#[test]
fn merging_is_monotone_and_mass_preserving() {
    let mut rng = StdRng::seed_from_u64(11);
    let points = random_colors(&mut rng, 40);
    let weights: Vec<f32> = (0..40).map(|i| (i + 1) as f32).collect();
    let total: f32 = weights.iter().sum();

    let mut previous = points.len();
    for epsilon in [0.0, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0] {
        let merged = merge(&points, &weights, epsilon, 0).unwrap();
        assert!(merged.len() <= points.len());
        assert!(merged.len() <= previous);
        previous = merged.len();

        let mass: f32 = merged.weights.iter().sum();
        assert!((mass - total).abs() / total < 1e-5);
    }
    assert_eq!(previous, 1);
}

#[test]
fn pipeline_weights_sum_to_one() {
    let mut rng = StdRng::seed_from_u64(5);
    let samples = random_colors(&mut rng, 2000);

    for k in [1, 4, 8, 12] {
        let config = AnalyzerConfig::default().with_cluster_count(k);
        let merged = cluster_samples(&samples, &config, &mut rng).unwrap();
        assert!(!merged.is_empty() && merged.len() <= k);
        let total: f32 = merged.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-4, "k = {k}: {total}");
    }
}

#[test]
fn transparent_surface_leaves_palette_untouched() {
    let sampler = ColorPaletteSampler::default();
    let mut rng = StdRng::seed_from_u64(2);

    let noise = RgbaImage::from_fn(50, 70, |x, y| {
        let v = ((x * 31 + y * 17) % 255) as u8;
        Rgba([v, 255 - v, (v / 2).wrapping_mul(3), 255])
    });
    let first = sampler.analyze_with_rng(&noise, &mut rng).unwrap().unwrap();
    let total: f32 = first.colors.iter().map(|c| c.weight).sum();
    assert!((total - 1.0).abs() < 1e-4);

    let clear = RgbaImage::from_pixel(32, 32, Rgba([200, 10, 10, 0]));
    assert!(sample_pixels(&clear, 4096).is_empty());
    assert!(sampler.analyze_with_rng(&clear, &mut rng).unwrap().is_none());
    assert_eq!(sampler.latest(), Some(first));
}

#[test]
fn accent_slots_are_consistent() {
    let img = RgbaImage::from_fn(90, 45, |x, y| match (x / 30, y / 15) {
        (0, _) => Rgba([240, 240, 240, 255]),
        (1, 0) => Rgba([20, 90, 220, 255]),
        (1, _) => Rgba([250, 200, 20, 255]),
        _ => Rgba([60, 60, 60, 255]),
    });

    let analyzer = AccentAnalyzer::default();
    let mut rng = StdRng::seed_from_u64(8);
    let accents = analyzer.analyze_with_rng(&img, &mut rng).unwrap().unwrap();

    assert!(accents.primary.colorfulness >= accents.secondary.colorfulness);
    assert!(accents.secondary.colorfulness >= accents.tertiary.colorfulness);
    assert!(accents.tertiary.colorfulness >= accents.base.colorfulness);
    assert!(accents.dominant.weight >= accents.primary.weight);
    assert!(accents.dominant.weight >= accents.base.weight);
    assert!(accents.colorfulness > 0.0);
}

#[test]
fn zero_clusters_is_an_invalid_argument() {
    let analyzer = AccentAnalyzer::new(AnalyzerConfig::default().with_cluster_count(0));
    let img = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
    assert!(matches!(
        analyzer.analyze(&img),
        Err(PaletteError::InvalidArgument(_))
    ));
}
