use image::{DynamicImage, RgbaImage, imageops::FilterType};
use palette::Srgb;
use tracing::{debug, warn};

/// Default number of pixels requested from a surface.
pub const DEFAULT_SAMPLE_COUNT: u32 = 4096;

/// Largest budget honored by [`target_size`]; bigger requests are clamped.
pub const MAX_SAMPLE_COUNT: u32 = 1 << 20;

/// Anything that can be rasterized into RGBA8 bytes at a requested size.
pub trait Surface {
    /// Natural size of the surface in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Render the surface to `width * height * 4` RGBA8 bytes.
    ///
    /// Returns `None` when the surface cannot be rendered.
    fn render(&self, width: u32, height: u32) -> Option<Vec<u8>>;
}

impl Surface for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn render(&self, width: u32, height: u32) -> Option<Vec<u8>> {
        if width == self.width() && height == self.height() {
            return Some(self.as_raw().clone());
        }
        Some(image::imageops::resize(self, width, height, FilterType::Triangle).into_raw())
    }
}

impl Surface for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn render(&self, width: u32, height: u32) -> Option<Vec<u8>> {
        if width == self.width() && height == self.height() {
            return Some(self.to_rgba8().into_raw());
        }
        Some(
            self.resize_exact(width, height, FilterType::Triangle)
                .to_rgba8()
                .into_raw(),
        )
    }
}

/// An absent surface renders nothing.
impl<S: Surface> Surface for Option<S> {
    fn dimensions(&self) -> (u32, u32) {
        self.as_ref().map_or((0, 0), Surface::dimensions)
    }

    fn render(&self, width: u32, height: u32) -> Option<Vec<u8>> {
        self.as_ref()?.render(width, height)
    }
}

impl<S: Surface + ?Sized> Surface for &S {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn render(&self, width: u32, height: u32) -> Option<Vec<u8>> {
        (**self).render(width, height)
    }
}

/// Size to render a `width`×`height` surface at so that it holds roughly
/// `budget` pixels, keeping the aspect ratio.
///
/// Surfaces smaller than the budget are sampled at their natural size and
/// the budget is clamped to [`MAX_SAMPLE_COUNT`].
pub fn target_size(width: u32, height: u32, budget: u32) -> Option<(u32, u32)> {
    let area = width as u64 * height as u64;
    if area == 0 || budget == 0 {
        return None;
    }

    let budget = budget.min(MAX_SAMPLE_COUNT);
    let scale = (budget as f64 / area as f64).sqrt().min(1.0);
    let out_w = ((width as f64 * scale).round() as u32).max(1);
    let out_h = ((height as f64 * scale).round() as u32).max(1);
    Some((out_w, out_h))
}

/// Render `surface` at about `budget` pixels and collect every non-transparent
/// pixel as a normalized RGB color.
///
/// An empty result means "no data": the surface was absent, had no area, or
/// failed to render.
pub fn sample_pixels<S: Surface + ?Sized>(surface: &S, budget: u32) -> Vec<Srgb<f32>> {
    let (width, height) = surface.dimensions();
    let Some((out_w, out_h)) = target_size(width, height, budget) else {
        debug!(width, height, budget, "nothing to sample");
        return Vec::new();
    };

    let Some(raw) = surface.render(out_w, out_h) else {
        debug!(out_w, out_h, "surface produced no pixels");
        return Vec::new();
    };

    let expected = (out_w as usize)
        .checked_mul(out_h as usize)
        .and_then(|n| n.checked_mul(4));
    if expected != Some(raw.len()) {
        warn!(len = raw.len(), ?expected, "rendered buffer has unexpected length");
        return Vec::new();
    }

    raw.chunks_exact(4)
        .filter(|px| px[3] != 0)
        .map(|px| Srgb::new(px[0], px[1], px[2]).into_format::<f32>())
        .collect()
}
