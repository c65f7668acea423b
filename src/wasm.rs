//! JavaScript bindings. Every export takes encoded image bytes (PNG, JPEG, ...)
//! and returns a plain object, or `null` when the image has no opaque pixels.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::analyzer::{AccentAnalyzer, AnalyzerConfig, ColorPaletteSampler};
use crate::assemble::{Accent, AccentPalette, PaletteColor, PaletteVariant, Weighted};
use crate::error::PaletteError;

fn to_js(err: PaletteError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn decode(input: &[u8]) -> Result<image::DynamicImage, JsValue> {
    image::load_from_memory(input)
        .map_err(|e| JsValue::from_str(&format!("Unable to decode image: {e}")))
}

fn config<V: PaletteVariant>(
    sample_count: Option<u32>,
    cluster_count: Option<u32>,
) -> AnalyzerConfig {
    let mut config = AnalyzerConfig::for_variant::<V>();
    if let Some(samples) = sample_count {
        config.sample_count = samples;
    }
    if let Some(k) = cluster_count {
        config.cluster_count = k as usize;
    }
    config
}

fn color_object(color: &PaletteColor) -> Result<Object, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &JsValue::from_str("hex"), &JsValue::from_str(&color.hex()))?;
    Reflect::set(&obj, &JsValue::from_str("weight"), &JsValue::from_f64(color.weight as f64))?;
    Reflect::set(
        &obj,
        &JsValue::from_str("colorfulness"),
        &JsValue::from_f64(color.colorfulness as f64),
    )?;
    Ok(obj)
}

/// Property names of the accent object, in output order.
fn accent_slots(accents: &AccentPalette) -> [(&'static str, &PaletteColor); 5] {
    [
        ("primary", &accents.primary),
        ("secondary", &accents.secondary),
        ("tertiary", &accents.tertiary),
        ("base", &accents.base),
        ("dominant", &accents.dominant),
    ]
}

/// Accent colors of an image:
/// `{ primary, secondary, tertiary, base, dominant, colorfulness }`, each
/// color being `{ hex, weight, colorfulness }`.
#[wasm_bindgen]
pub fn analyze_accents(
    input: Vec<u8>,
    sample_count: Option<u32>,
    cluster_count: Option<u32>,
) -> Result<JsValue, JsValue> {
    let img = decode(&input)?;
    let analyzer = AccentAnalyzer::new(config::<Accent>(sample_count, cluster_count));
    let Some(accents) = analyzer.analyze(&img).map_err(to_js)? else {
        return Ok(JsValue::NULL);
    };

    let result = Object::new();
    for (name, color) in accent_slots(&accents) {
        let obj = color_object(color)?;
        Reflect::set(&result, &JsValue::from_str(name), &obj)?;
    }
    Reflect::set(
        &result,
        &JsValue::from_str("colorfulness"),
        &JsValue::from_f64(accents.colorfulness as f64),
    )?;
    Ok(result.into())
}

/// Weighted palette of an image: `{ colors: [{ hex, weight, colorfulness }], colorfulness }`.
#[wasm_bindgen]
pub fn sample_palette(
    input: Vec<u8>,
    sample_count: Option<u32>,
    cluster_count: Option<u32>,
) -> Result<JsValue, JsValue> {
    let img = decode(&input)?;
    let sampler = ColorPaletteSampler::new(config::<Weighted>(sample_count, cluster_count));
    let Some(palette) = sampler.analyze(&img).map_err(to_js)? else {
        return Ok(JsValue::NULL);
    };

    let colors = Array::new();
    for color in &palette.colors {
        let obj = color_object(color)?;
        colors.push(&obj);
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("colors"), &colors)?;
    Reflect::set(
        &result,
        &JsValue::from_str("colorfulness"),
        &JsValue::from_f64(palette.colorfulness as f64),
    )?;
    Ok(result.into())
}
