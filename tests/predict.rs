use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ferrite_food::model::{ArtifactPaths, DecisionTree, Node, RandomForest};
use ferrite_food::{
    ClassifierModel, LabelEncoder, ModelArtifacts, Outcome, Predictor, ScalerModel, ExtractionPlan,
    UNKNOWN_LABEL,
};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

const COMBINED_96: usize = 96 * 96 * 3 + 4356;

fn save_png(dir: &Path, name: &str, color: [u8; 3]) -> std::path::PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(96, 96, Rgb(color)).save(&path).unwrap();
    path
}

/// One stump on the first red value: dark images are "arroz", bright ones "pizza".
fn write_artifacts(dir: &Path, n_features: usize) -> ArtifactPaths {
    let paths = ArtifactPaths {
        classifier: dir.join("rf_food_classifier.json"),
        scaler: dir.join("scaler.json"),
        label_encoder: dir.join("label_encoder.json"),
    };
    let forest = RandomForest {
        n_features,
        n_classes: 2,
        trees: vec![DecisionTree::new(vec![
            Node::Split { feature: 0, threshold: 0.5, left: 1, right: 2 },
            Node::Leaf { distribution: vec![3.0, 1.0] },
            Node::Leaf { distribution: vec![0.0, 4.0] },
        ])],
    };
    ClassifierModel::RandomForest(forest).save_json(&paths.classifier).unwrap();
    ScalerModel::standard(vec![0.0; n_features], vec![1.0; n_features])
        .save_json(&paths.scaler)
        .unwrap();
    LabelEncoder::new(vec!["arroz".into(), "pizza".into()])
        .unwrap()
        .save_json(&paths.label_encoder)
        .unwrap();
    paths
}

fn predictor(paths: &ArtifactPaths) -> Predictor {
    Predictor::new(ModelArtifacts::load(paths), ExtractionPlan::default())
}

#[test]
fn recognizes_with_combined_features() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), COMBINED_96);
    let predictor = predictor(&paths);
    assert!(predictor.artifacts().ready().is_some());

    let red = save_png(dir.path(), "red.png", [250, 10, 10]);
    let result = predictor.predict(&red).unwrap();
    assert_eq!(result.outcome, Outcome::Recognized);
    assert_eq!(result.label, "pizza");
    assert!((0.0..=1.0).contains(&result.confidence));

    let dark = save_png(dir.path(), "dark.png", [20, 20, 20]);
    let result = predictor.predict(&dark).unwrap();
    assert_eq!(result.label, "arroz");
    assert!((result.confidence - 0.75).abs() < 1e-9);
}

#[test]
fn hog_only_scaler_is_matched() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), 1764);
    let predictor = predictor(&paths);

    let img = save_png(dir.path(), "plate.png", [120, 200, 40]);
    let result = predictor.predict(&img).unwrap();
    assert!(result.is_recognized());
    assert!(["arroz", "pizza"].contains(&result.label.as_str()));
}

#[test]
fn unmatched_length_returns_sentinel() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), 1000);
    let predictor = predictor(&paths);

    let img = save_png(dir.path(), "plate.png", [120, 200, 40]);
    let result = predictor.predict(&img).unwrap();
    assert_eq!(result.label, UNKNOWN_LABEL);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.outcome, Outcome::FeatureMismatch);
}

#[test]
fn missing_artifacts_return_sentinel() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), COMBINED_96);
    std::fs::remove_file(&paths.classifier).unwrap();
    let predictor = predictor(&paths);
    assert!(predictor.artifacts().ready().is_none());

    // Not even a real image: with models missing the file is never opened.
    let result = predictor.predict(&dir.path().join("nope.png")).unwrap();
    assert_eq!(result.label, UNKNOWN_LABEL);
    assert_eq!(result.outcome, Outcome::ModelsUnavailable);
}

#[test]
fn corrupt_artifact_leaves_slot_empty() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), COMBINED_96);
    std::fs::write(&paths.scaler, b"{ not json").unwrap();
    let artifacts = ModelArtifacts::load(&paths);
    assert!(artifacts.scaler.is_none());
    assert!(artifacts.classifier.is_some());
    assert!(!artifacts.status().scaler_loaded);
}

#[test]
fn undecodable_upload_is_an_error() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), COMBINED_96);
    let predictor = predictor(&paths);

    let bogus = dir.path().join("bogus.jpg");
    std::fs::write(&bogus, b"definitely not a jpeg").unwrap();
    assert!(predictor.predict(&bogus).is_err());
}

#[test]
fn repeated_predictions_agree() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path(), COMBINED_96);
    let predictor = Arc::new(predictor(&paths));

    let img = save_png(dir.path(), "red.png", [250, 10, 10]);
    let first = predictor.predict(&img).unwrap();
    let second = Arc::clone(&predictor)
        .predict_with_timeout(&img, Duration::from_secs(30))
        .unwrap();
    assert_eq!(first, second);
}
