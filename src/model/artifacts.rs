use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ArtifactLoadError;
use crate::model::classifier::ClassifierModel;
use crate::model::label_encoder::LabelEncoder;
use crate::model::scaler::ScalerModel;

/// Where the three artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub scaler: PathBuf,
    pub label_encoder: PathBuf,
}

/// The loaded model artifacts. Built once at startup and never mutated;
/// a slot is `None` when its artifact failed to load.
#[derive(Debug, Clone, Default)]
pub struct ModelArtifacts {
    pub classifier: Option<ClassifierModel>,
    pub scaler: Option<ScalerModel>,
    pub label_encoder: Option<LabelEncoder>,
}

/// Borrowed view available only when every artifact is present.
#[derive(Debug, Clone, Copy)]
pub struct ReadyModels<'a> {
    pub classifier: &'a ClassifierModel,
    pub scaler: &'a ScalerModel,
    pub label_encoder: &'a LabelEncoder,
}

/// Summary served by the status endpoint and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub classifier_loaded: bool,
    pub scaler_loaded: bool,
    pub label_encoder_loaded: bool,
    pub expected_features: Option<usize>,
    /// Free-text note stored with the scaler, if any.
    pub scaler_description: Option<String>,
    pub classes: Vec<String>,
}

impl ModelArtifacts {
    pub fn new(
        classifier: Option<ClassifierModel>,
        scaler: Option<ScalerModel>,
        label_encoder: Option<LabelEncoder>,
    ) -> Self {
        ModelArtifacts { classifier, scaler, label_encoder }
    }

    /// Loads each artifact independently. Never fails: a missing or broken
    /// file is logged and leaves its slot empty.
    pub fn load(paths: &ArtifactPaths) -> Self {
        let artifacts = ModelArtifacts {
            classifier: load_slot("classifier", &paths.classifier, ClassifierModel::load_json),
            scaler: load_slot("scaler", &paths.scaler, ScalerModel::load_json),
            label_encoder: load_slot("label encoder", &paths.label_encoder, LabelEncoder::load_json),
        };
        artifacts.check_consistency();
        if artifacts.ready().is_none() {
            warn!("models incomplete; every prediction will return the unknown label");
        }
        artifacts
    }

    pub fn ready(&self) -> Option<ReadyModels<'_>> {
        Some(ReadyModels {
            classifier: self.classifier.as_ref()?,
            scaler: self.scaler.as_ref()?,
            label_encoder: self.label_encoder.as_ref()?,
        })
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            classifier_loaded: self.classifier.is_some(),
            scaler_loaded: self.scaler.is_some(),
            label_encoder_loaded: self.label_encoder.is_some(),
            expected_features: self.scaler.as_ref().and_then(ScalerModel::expected_features),
            scaler_description: self
                .scaler
                .as_ref()
                .and_then(|s| s.metadata.as_ref())
                .and_then(|m| m.description.clone()),
            classes: self
                .label_encoder
                .as_ref()
                .map(|enc| enc.classes().to_vec())
                .unwrap_or_default(),
        }
    }

    /// Logs disagreements between artifacts that were fit together.
    fn check_consistency(&self) {
        if let (Some(clf), Some(scaler)) = (&self.classifier, &self.scaler) {
            if let (Some(n), Some(expected)) = (clf.n_features(), scaler.expected_features()) {
                if n != expected {
                    warn!(classifier = n, scaler = expected, "classifier and scaler disagree on feature count");
                }
            }
        }
        if let (Some(clf), Some(enc)) = (&self.classifier, &self.label_encoder) {
            if let Some(n) = clf.n_classes() {
                if n != enc.len() {
                    warn!(classifier = n, encoder = enc.len(), "classifier and label encoder disagree on class count");
                }
            }
        }
    }
}

fn load_slot<T>(
    kind: &str,
    path: &Path,
    loader: fn(&Path) -> Result<T, ArtifactLoadError>,
) -> Option<T> {
    match loader(path) {
        Ok(artifact) => {
            info!(path = %path.display(), "loaded {}", kind);
            Some(artifact)
        }
        Err(e) => {
            error!("failed to load {}: {}", kind, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forest::{DecisionTree, Node, RandomForest};

    fn paths_in(dir: &Path) -> ArtifactPaths {
        ArtifactPaths {
            classifier: dir.join("clf.json"),
            scaler: dir.join("scaler.json"),
            label_encoder: dir.join("labels.json"),
        }
    }

    #[test]
    fn missing_files_leave_empty_slots() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ModelArtifacts::load(&paths_in(dir.path()));
        assert!(artifacts.ready().is_none());
        let status = artifacts.status();
        assert!(!status.classifier_loaded && !status.scaler_loaded && !status.label_encoder_loaded);
    }

    #[test]
    fn partial_load_keeps_good_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        LabelEncoder::fit(["pizza", "sushi"]).save_json(&paths.label_encoder).unwrap();
        std::fs::write(&paths.scaler, "{ broken").unwrap();

        let artifacts = ModelArtifacts::load(&paths);
        assert!(artifacts.label_encoder.is_some());
        assert!(artifacts.scaler.is_none());
        assert!(artifacts.ready().is_none());
        assert_eq!(artifacts.status().classes, vec!["pizza", "sushi"]);
    }

    #[test]
    fn full_load_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        ScalerModel::standard(vec![0.0; 2], vec![1.0; 2]).save_json(&paths.scaler).unwrap();
        LabelEncoder::fit(["a", "b"]).save_json(&paths.label_encoder).unwrap();
        ClassifierModel::RandomForest(RandomForest {
            n_features: 2,
            n_classes: 2,
            trees: vec![DecisionTree::new(vec![Node::Leaf { distribution: vec![1.0, 1.0] }])],
        })
        .save_json(&paths.classifier)
        .unwrap();

        let artifacts = ModelArtifacts::load(&paths);
        assert!(artifacts.ready().is_some());
        assert_eq!(artifacts.status().expected_features, Some(2));
        assert_eq!(artifacts.status().scaler_description, None);
    }

    #[test]
    fn status_reports_scaler_description() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        std::fs::write(
            &paths.scaler,
            r#"{"transform":{"type":"Passthrough"},"metadata":{"description":"fit on food-101 subset"}}"#,
        )
        .unwrap();
        let status = ModelArtifacts::load(&paths).status();
        assert_eq!(status.scaler_description.as_deref(), Some("fit on food-101 subset"));
    }
}
