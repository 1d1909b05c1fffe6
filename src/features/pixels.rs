/// Pixel-level feature helpers.
use image::RgbImage;

use crate::math::matrix::Matrix;

/// Flattens as R, G, B, ... in row-major order, normalized to [0, 1].
///
/// Returns a `Vec<f64>` of length `width * height * 3`.
pub fn flatten_rgb(img: &RgbImage) -> Vec<f64> {
    img.as_raw().iter().map(|&c| c as f64 / 255.0).collect()
}

/// Single-channel intensity as the plain mean of R, G and B, kept in the
/// 0..=255 range. Rows are image rows.
pub fn mean_gray(img: &RgbImage) -> Matrix {
    let (width, height) = img.dimensions();
    let data = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    let [r, g, b] = img.get_pixel(x, y).0;
                    (r as f64 + g as f64 + b as f64) / 3.0
                })
                .collect()
        })
        .collect();
    Matrix { rows: height as usize, cols: width as usize, data }
}
