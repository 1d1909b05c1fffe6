use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ValidationError};
use crate::model::{invalid, read_json, write_json};

/// Bijection between class index and food name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Builds an encoder with the given index order. Names must be unique
    /// and non-empty.
    pub fn new(classes: Vec<String>) -> Result<Self, ValidationError> {
        let encoder = LabelEncoder { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Builds an encoder from raw labels: unique, sorted.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        classes.retain(|c| !c.is_empty());
        LabelEncoder { classes }
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.classes.is_empty() {
            return Err(ValidationError::NoClasses);
        }
        let mut seen = HashSet::new();
        for class in &self.classes {
            if class.is_empty() {
                return Err(ValidationError::EmptyClassName);
            }
            if !seen.insert(class.as_str()) {
                return Err(ValidationError::DuplicateClass(class.clone()));
            }
        }
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<LabelEncoder, ArtifactLoadError> {
        let encoder: LabelEncoder = read_json(path)?;
        encoder.validate().map_err(|e| invalid(path, e))?;
        Ok(encoder)
    }

    pub fn save_json(&self, path: &Path) -> std::io::Result<()> {
        write_json(self, path)
    }
}
