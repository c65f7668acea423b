//! Opponent-color colorfulness (red-green / yellow-blue).

use palette::Srgb;

/// Colorfulness of a single color. Gray has a colorfulness of exactly zero.
pub fn colorfulness(color: Srgb<f32>) -> f32 {
    let rg = color.red - color.green;
    let yb = (color.red + color.green) / 2.0 - color.blue;
    0.3 * (rg * rg + yb * yb).sqrt()
}

/// Colorfulness of a set of colors.
///
/// Combines the spread of the opponent channels with their average:
/// `|(std_rg, std_yb)| + 0.3 * |(mean_rg, mean_yb)|`. Returns zero for an
/// empty set.
pub fn colorfulness_of(colors: &[Srgb<f32>]) -> f32 {
    if colors.is_empty() {
        return 0.0;
    }

    let n = colors.len() as f32;
    let opponents: Vec<(f32, f32)> = colors
        .iter()
        .map(|c| {
            let rg = (c.red - c.green).abs();
            let yb = (0.5 * (c.red + c.green) - c.blue).abs();
            (rg, yb)
        })
        .collect();

    let mean_rg = opponents.iter().map(|o| o.0).sum::<f32>() / n;
    let mean_yb = opponents.iter().map(|o| o.1).sum::<f32>() / n;

    let var_rg = opponents.iter().map(|o| (o.0 - mean_rg).powi(2)).sum::<f32>() / n;
    let var_yb = opponents.iter().map(|o| (o.1 - mean_yb).powi(2)).sum::<f32>() / n;

    let std_len = (var_rg + var_yb).sqrt();
    let mean_len = (mean_rg * mean_rg + mean_yb * mean_yb).sqrt();
    std_len + 0.3 * mean_len
}
