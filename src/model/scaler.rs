use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ScaleError, ValidationError};
use crate::features::Candidate;
use crate::model::metadata::ScalerMetadata;
use crate::model::{invalid, read_json, write_json};

/// The fitted transform itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScalerTransform {
    /// `(x - mean) / scale`, per feature. A zero scale is treated as 1.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Identity with no recorded dimensionality.
    Passthrough,
}

/// A fitted feature scaler loaded from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerModel {
    pub transform: ScalerTransform,
    #[serde(default)]
    pub metadata: Option<ScalerMetadata>,
}

impl ScalerModel {
    pub fn standard(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        ScalerModel { transform: ScalerTransform::Standard { mean, scale }, metadata: None }
    }

    pub fn passthrough() -> Self {
        ScalerModel { transform: ScalerTransform::Passthrough, metadata: None }
    }

    /// Records which feature layout this scaler was fit on.
    pub fn with_feature_scheme(mut self, candidate: Candidate) -> Self {
        self.metadata.get_or_insert_with(ScalerMetadata::default).feature_scheme = Some(candidate);
        self
    }

    /// Number of features the scaler was fit on, if recorded.
    pub fn expected_features(&self) -> Option<usize> {
        match &self.transform {
            ScalerTransform::Standard { mean, .. } => Some(mean.len()),
            ScalerTransform::Passthrough => None,
        }
    }

    pub fn scheme_marker(&self) -> Option<&Candidate> {
        self.metadata.as_ref().and_then(|m| m.feature_scheme.as_ref())
    }

    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScaleError> {
        match &self.transform {
            ScalerTransform::Standard { mean, scale } => {
                if features.len() != mean.len() {
                    return Err(ScaleError::DimensionMismatch {
                        expected: mean.len(),
                        actual: features.len(),
                    });
                }
                Ok(features
                    .iter()
                    .zip(mean.iter().zip(scale.iter()))
                    .map(|(x, (m, s))| (x - m) / if *s == 0.0 { 1.0 } else { *s })
                    .collect())
            }
            ScalerTransform::Passthrough => Ok(features.to_vec()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let ScalerTransform::Standard { mean, scale } = &self.transform {
            if mean.len() != scale.len() {
                return Err(ValidationError::ScalerLengths { mean: mean.len(), scale: scale.len() });
            }
            if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
                return Err(ValidationError::NonFiniteScaler);
            }
        }
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<ScalerModel, ArtifactLoadError> {
        let scaler: ScalerModel = read_json(path)?;
        scaler.validate().map_err(|e| invalid(path, e))?;
        Ok(scaler)
    }

    pub fn save_json(&self, path: &Path) -> std::io::Result<()> {
        write_json(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureScheme, HogParams, ResolutionSpec};

    #[test]
    fn standardizes_per_feature() {
        let scaler = ScalerModel::standard(vec![1.0, 2.0, 3.0], vec![2.0, 0.0, 0.5]);
        assert_eq!(scaler.expected_features(), Some(3));
        assert_eq!(scaler.transform(&[3.0, 5.0, 4.0]).unwrap(), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn rejects_wrong_dimensionality() {
        let scaler = ScalerModel::standard(vec![0.0; 4], vec![1.0; 4]);
        assert_eq!(
            scaler.transform(&[1.0; 5]),
            Err(ScaleError::DimensionMismatch { expected: 4, actual: 5 })
        );
    }

    #[test]
    fn passthrough_has_no_expectation() {
        let scaler = ScalerModel::passthrough();
        assert_eq!(scaler.expected_features(), None);
        assert_eq!(scaler.transform(&[7.0, 8.0]).unwrap(), vec![7.0, 8.0]);
    }

    #[test]
    fn mismatched_mean_and_scale_are_invalid() {
        assert_eq!(
            ScalerModel::standard(vec![0.0; 3], vec![1.0; 2]).validate(),
            Err(ValidationError::ScalerLengths { mean: 3, scale: 2 })
        );
    }

    #[test]
    fn parses_artifact_with_and_without_metadata() {
        let bare = r#"{"transform":{"type":"Standard","mean":[0.0,1.0],"scale":[1.0,1.0]}}"#;
        let scaler: ScalerModel = serde_json::from_str(bare).unwrap();
        assert_eq!(scaler.scheme_marker(), None);

        let marked = ScalerModel::passthrough().with_feature_scheme(Candidate::new(
            ResolutionSpec::new(128, HogParams::with_cell(16)),
            FeatureScheme::Hog,
        ));
        let json = serde_json::to_string(&marked).unwrap();
        let back: ScalerModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scheme_marker().and_then(Candidate::feature_len), Some(1764));
    }

    #[test]
    fn load_reports_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, r#"{"transform":{"type":"Standard","mean":[0.0],"scale":[]}}"#).unwrap();
        assert!(matches!(ScalerModel::load_json(&path), Err(ArtifactLoadError::Invalid { .. })));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(ScalerModel::load_json(&path), Err(ArtifactLoadError::Parse { .. })));
    }
}
