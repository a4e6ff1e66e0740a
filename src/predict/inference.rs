//! Prediction backends.
//!
//! Only the dummy linear model ships in this build; a model file on disk is
//! detected and reported but cannot be executed without an inference runtime.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::ModelConfig;
use crate::predict::PredictError;

/// Output of a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Something that maps an input value to a prediction.
pub trait Predictor: Send + Sync {
    fn predict(&self, x: f32) -> Prediction;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// `y = 3x + 0.5`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyPredictor;

impl Predictor for DummyPredictor {
    fn predict(&self, x: f32) -> Prediction {
        Prediction {
            y: 3.0 * x + 0.5,
            note: Some("dummy".to_string()),
        }
    }

    fn name(&self) -> &'static str {
        "dummy"
    }
}

/// Pick the predictor for this process based on what is on disk.
pub fn select_predictor(config: &ModelConfig) -> Result<Arc<dyn Predictor>, PredictError> {
    let present = Path::new(&config.path).exists();

    if present {
        tracing::info!(
            model_path = %config.path,
            "Model present but binary built without an inference runtime; using dummy"
        );
    } else {
        tracing::info!(model_path = %config.path, "No model file found; using dummy inference");
        if config.fail_on_missing {
            tracing::error!(model_path = %config.path, "FAIL_ON_MISSING_MODEL set; model missing");
            return Err(PredictError::ModelMissing(config.path.clone()));
        }
    }

    Ok(Arc::new(DummyPredictor))
}
