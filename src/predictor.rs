//! Request-level prediction.
//!
//! The predictor is the pipeline's firewall: every failure below it turns
//! into a zero-confidence sentinel result, except an upload that cannot be
//! decoded at all.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{DecodeError, PredictionError};
use crate::features::ExtractionPlan;
use crate::model::{ModelArtifacts, ReadyModels};
use crate::preprocess::load_image;
use crate::resolve::Resolver;

/// Label returned whenever no real prediction is available.
pub const UNKNOWN_LABEL: &str = "alimento_desconhecido";

/// Default cap on timed prediction workers alive at once.
pub const DEFAULT_WORKER_LIMIT: usize = 32;

/// Why a result carries the label it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Recognized,
    ModelsUnavailable,
    FeatureMismatch,
    PredictionFailed,
    TimedOut,
    /// Too many timed predictions were still running to start another.
    Overloaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    /// Probability of `label`, in [0, 1]. Always 0.0 for sentinels.
    pub confidence: f64,
    pub outcome: Outcome,
}

impl PredictionResult {
    pub fn recognized(label: impl Into<String>, confidence: f64) -> Self {
        PredictionResult {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
            outcome: Outcome::Recognized,
        }
    }

    pub fn unavailable(outcome: Outcome) -> Self {
        PredictionResult { label: UNKNOWN_LABEL.to_owned(), confidence: 0.0, outcome }
    }

    pub fn is_recognized(&self) -> bool {
        self.outcome == Outcome::Recognized
    }
}

/// Immutable prediction context: the loaded artifacts plus the extraction
/// plan. Share it across threads behind an `Arc`.
#[derive(Debug)]
pub struct Predictor {
    artifacts: ModelArtifacts,
    plan: ExtractionPlan,
    worker_limit: usize,
    workers: Arc<AtomicUsize>,
}

impl Predictor {
    pub fn new(artifacts: ModelArtifacts, plan: ExtractionPlan) -> Self {
        Predictor {
            artifacts,
            plan,
            worker_limit: DEFAULT_WORKER_LIMIT,
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Caps how many `predict_with_timeout` workers may run at once,
    /// including ones whose caller already gave up.
    pub fn with_worker_limit(mut self, limit: usize) -> Self {
        self.worker_limit = limit;
        self
    }

    /// Timed prediction workers currently running.
    pub fn workers_in_flight(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn plan(&self) -> &ExtractionPlan {
        &self.plan
    }

    /// Predicts the food in the image at `path`.
    ///
    /// Only an undecodable file is an error. With incomplete models the
    /// file is not even opened.
    pub fn predict(&self, path: &Path) -> Result<PredictionResult, DecodeError> {
        if self.artifacts.ready().is_none() {
            warn!(path = %path.display(), "models not loaded; returning unknown label");
            return Ok(PredictionResult::unavailable(Outcome::ModelsUnavailable));
        }
        let image = load_image(path)?;
        Ok(self.predict_image(&image))
    }

    /// Predicts on an already decoded image.
    pub fn predict_image(&self, image: &RgbImage) -> PredictionResult {
        let Some(models) = self.artifacts.ready() else {
            return PredictionResult::unavailable(Outcome::ModelsUnavailable);
        };

        let features = match Resolver::new(&self.plan).resolve(image, models.scaler) {
            Ok(features) => features,
            Err(e) => {
                warn!(expected = ?e.expected, attempted = ?e.attempted, "{}", e);
                return PredictionResult::unavailable(Outcome::FeatureMismatch);
            }
        };

        match classify(&models, &features.scaled) {
            Ok((label, confidence)) => {
                debug!(candidate = %features.candidate, %label, confidence, "prediction");
                PredictionResult::recognized(label, confidence)
            }
            Err(e) => {
                error!(candidate = %features.candidate, "prediction failed: {}", e);
                PredictionResult::unavailable(Outcome::PredictionFailed)
            }
        }
    }

    /// Runs `predict` on a worker thread and gives up after `timeout`.
    ///
    /// A timed-out worker keeps running to completion and its result is
    /// dropped. While `worker_limit` workers are alive, new calls return
    /// `Outcome::Overloaded` without starting one.
    pub fn predict_with_timeout(
        self: Arc<Self>,
        path: &Path,
        timeout: Duration,
    ) -> Result<PredictionResult, DecodeError> {
        let Some(slot) = WorkerSlot::acquire(&self.workers, self.worker_limit) else {
            warn!(path = %path.display(), limit = self.worker_limit, "too many predictions in flight");
            return Ok(PredictionResult::unavailable(Outcome::Overloaded));
        };

        let (tx, rx) = mpsc::channel();
        let owned_path = path.to_path_buf();
        std::thread::spawn(move || {
            let result = self.predict(&owned_path);
            drop(slot);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(path = %path.display(), ?timeout, "prediction timed out");
                Ok(PredictionResult::unavailable(Outcome::TimedOut))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                error!(path = %path.display(), "prediction worker exited without a result");
                Ok(PredictionResult::unavailable(Outcome::PredictionFailed))
            }
        }
    }
}

/// A claimed place in the worker count, released on drop.
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    fn acquire(counter: &Arc<AtomicUsize>, limit: usize) -> Option<WorkerSlot> {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < limit).then_some(n + 1))
            .ok()
            .map(|_| WorkerSlot(Arc::clone(counter)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn classify(models: &ReadyModels<'_>, scaled: &[f64]) -> Result<(String, f64), PredictionError> {
    let (index, confidence) = models.classifier.predict(scaled)?;
    let label = models
        .label_encoder
        .decode(index)
        .ok_or(PredictionError::UnknownClassIndex(index))?;
    Ok((label.to_owned(), confidence))
}
