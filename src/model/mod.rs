pub mod artifacts;
pub mod classifier;
pub mod forest;
pub mod label_encoder;
pub mod metadata;
pub mod scaler;

pub use artifacts::{ArtifactPaths, ArtifactStatus, ModelArtifacts, ReadyModels};
pub use classifier::ClassifierModel;
pub use forest::{DecisionTree, Node, RandomForest};
pub use label_encoder::LabelEncoder;
pub use metadata::ScalerMetadata;
pub use scaler::{ScalerModel, ScalerTransform};

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ArtifactLoadError, ValidationError};

/// Deserializes an artifact from a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let file = std::fs::File::open(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes an artifact to a pretty-printed JSON file.
pub(crate) fn write_json<T: Serialize>(value: &T, path: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

pub(crate) fn invalid(path: &Path, source: ValidationError) -> ArtifactLoadError {
    ArtifactLoadError::Invalid { path: path.to_path_buf(), source }
}
