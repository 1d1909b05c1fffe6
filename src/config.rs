use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::features::ExtractionPlan;
use crate::model::ArtifactPaths;
use crate::predictor::DEFAULT_WORKER_LIMIT;

/// Service configuration. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding the three model artifacts.
    pub model_dir: PathBuf,
    pub classifier_file: String,
    pub scaler_file: String,
    pub label_encoder_file: String,
    /// Where uploaded images are written.
    pub upload_dir: PathBuf,
    pub bind_addr: String,
    /// Accepted upload extensions, lower case, without the dot.
    pub allowed_extensions: Vec<String>,
    pub request_timeout_ms: u64,
    /// Cap on timed prediction workers alive at once.
    pub max_prediction_workers: usize,
    pub max_upload_bytes: usize,
    pub extraction: ExtractionPlan,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            model_dir: PathBuf::from("modelos_salvos"),
            classifier_file: "rf_food_classifier.json".to_owned(),
            scaler_file: "scaler.json".to_owned(),
            label_encoder_file: "label_encoder.json".to_owned(),
            upload_dir: PathBuf::from("uploads"),
            bind_addr: "0.0.0.0:5000".to_owned(),
            allowed_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            request_timeout_ms: 10_000,
            max_prediction_workers: DEFAULT_WORKER_LIMIT,
            max_upload_bytes: 16 * 1024 * 1024,
            extraction: ExtractionPlan::default(),
        }
    }
}

impl ServiceConfig {
    pub fn load_json(path: &Path) -> Result<ServiceConfig, ConfigError> {
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
        match path {
            Some(path) => ServiceConfig::load_json(path),
            None => Ok(ServiceConfig::default()),
        }
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            classifier: self.model_dir.join(&self.classifier_file),
            scaler: self.model_dir.join(&self.scaler_file),
            label_encoder: self.model_dir.join(&self.label_encoder_file),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whether `filename` has one of the allowed extensions.
    pub fn is_allowed_file(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}
