/// Image preprocessing for the recognition pipeline.
///
/// These functions decode image files (PNG/JPEG/BMP/GIF) into an
/// 8-bit RGB grid and resample it to the square resolutions the feature
/// extractor asks for.
use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;

use crate::error::DecodeError;

/// Opens and decodes an image file, converting it to 8-bit RGB.
pub fn load_image(path: &Path) -> Result<RgbImage, DecodeError> {
    let img = image::open(path).map_err(|source| DecodeError {
        origin: path.display().to_string(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Resamples `img` to exactly `size × size` with a bilinear filter.
///
/// Aspect ratio is not preserved, matching how the models were trained.
pub fn resize_square(img: &RgbImage, size: u32) -> RgbImage {
    if img.width() == size && img.height() == size {
        return img.clone();
    }
    image::imageops::resize(img, size, size, FilterType::Triangle)
}
