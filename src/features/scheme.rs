use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::features::hog::{hog, HogParams};
use crate::features::pixels::{flatten_rgb, mean_gray};
use crate::preprocess::resize_square;

/// One square working resolution and the descriptor settings used at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionSpec {
    pub size: u32,
    #[serde(default)]
    pub hog: HogParams,
}

impl ResolutionSpec {
    pub fn new(size: u32, hog: HogParams) -> Self {
        ResolutionSpec { size, hog }
    }
}

/// The feature layouts models have been trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureScheme {
    /// Normalized RGB flatten followed by the HOG descriptor.
    Combined,
    /// Normalized RGB flatten only.
    Flat,
    /// HOG descriptor only.
    Hog,
}

impl FeatureScheme {
    /// Per-resolution matching precedence.
    pub const PRECEDENCE: [FeatureScheme; 3] =
        [FeatureScheme::Combined, FeatureScheme::Flat, FeatureScheme::Hog];

    pub fn name(self) -> &'static str {
        match self {
            FeatureScheme::Combined => "combined",
            FeatureScheme::Flat => "flat",
            FeatureScheme::Hog => "hog",
        }
    }

    /// Length of the vector this scheme emits at `res`, without computing it.
    pub fn feature_len(self, res: &ResolutionSpec) -> Option<usize> {
        let flat = (res.size as usize) * (res.size as usize) * 3;
        match self {
            FeatureScheme::Flat => Some(flat),
            FeatureScheme::Hog => res.hog.descriptor_len(res.size),
            FeatureScheme::Combined => res.hog.descriptor_len(res.size).map(|h| flat + h),
        }
    }

    /// Resizes `image` to `res` and computes this scheme's vector.
    pub fn extract(self, image: &RgbImage, res: &ResolutionSpec) -> Result<Vec<f64>, FeatureError> {
        let resized = resize_square(image, res.size);
        match self {
            FeatureScheme::Flat => Ok(flatten_rgb(&resized)),
            FeatureScheme::Hog => hog(&mean_gray(&resized), &res.hog),
            FeatureScheme::Combined => {
                let descriptor = hog(&mean_gray(&resized), &res.hog)?;
                let mut features = flatten_rgb(&resized);
                features.extend(descriptor);
                Ok(features)
            }
        }
    }
}

/// A (resolution, scheme) pair the resolver can try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub resolution: ResolutionSpec,
    pub scheme: FeatureScheme,
}

impl Candidate {
    pub fn new(resolution: ResolutionSpec, scheme: FeatureScheme) -> Self {
        Candidate { resolution, scheme }
    }

    pub fn feature_len(&self) -> Option<usize> {
        self.scheme.feature_len(&self.resolution)
    }

    pub fn extract(&self, image: &RgbImage) -> Result<Vec<f64>, FeatureError> {
        self.scheme.extract(image, &self.resolution)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            FeatureScheme::Flat => write!(f, "flat@{}px", self.resolution.size),
            scheme => write!(
                f,
                "{}@{}px/cell{}",
                scheme.name(),
                self.resolution.size,
                self.resolution.hog.pixels_per_cell
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 { Rgb([240, 200, 40]) } else { Rgb([20, 90, 10]) }
        })
    }

    #[test]
    fn extracted_lengths_match_declared_lengths() {
        let img = checker(150);
        for res in [
            ResolutionSpec::new(96, HogParams::with_cell(8)),
            ResolutionSpec::new(64, HogParams::with_cell(16)),
            ResolutionSpec::new(128, HogParams::with_cell(16)),
        ] {
            for scheme in FeatureScheme::PRECEDENCE {
                let v = scheme.extract(&img, &res).unwrap();
                assert_eq!(Some(v.len()), scheme.feature_len(&res), "{:?} at {}", scheme, res.size);
            }
        }
    }

    #[test]
    fn combined_is_flat_then_hog() {
        let img = checker(96);
        let res = ResolutionSpec::new(96, HogParams::with_cell(8));
        let flat = FeatureScheme::Flat.extract(&img, &res).unwrap();
        let hog = FeatureScheme::Hog.extract(&img, &res).unwrap();
        let combined = FeatureScheme::Combined.extract(&img, &res).unwrap();
        assert_eq!(combined.len(), 27648 + 4356);
        assert_eq!(&combined[..flat.len()], flat.as_slice());
        assert_eq!(&combined[flat.len()..], hog.as_slice());
    }

    #[test]
    fn display_names_the_candidate() {
        let res = ResolutionSpec::new(128, HogParams::with_cell(16));
        assert_eq!(Candidate::new(res, FeatureScheme::Hog).to_string(), "hog@128px/cell16");
        assert_eq!(Candidate::new(res, FeatureScheme::Flat).to_string(), "flat@128px");
    }

    #[test]
    fn hog_len_is_none_when_blocks_do_not_fit() {
        let res = ResolutionSpec::new(16, HogParams::with_cell(16));
        assert_eq!(FeatureScheme::Hog.feature_len(&res), None);
        assert_eq!(FeatureScheme::Combined.feature_len(&res), None);
        assert_eq!(FeatureScheme::Flat.feature_len(&res), Some(768));
    }
}
