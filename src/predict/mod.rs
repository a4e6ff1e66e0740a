//! Prediction service built on the HTTP core.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ModelConfig → inference.rs (select predictor)
//!     CorsConfig  → cors.rs (CorsPolicy)
//!     → PredictService → routes() → Router
//!
//! Per request:
//!     GET /health      → "ok"
//!     OPTIONS /predict → 204 + CORS
//!     POST /predict    → JSON {"x"} → Predictor → JSON {"y", "note"} + CORS
//! ```

pub mod cors;
pub mod handlers;
pub mod inference;

use std::sync::Arc;

use thiserror::Error;

use crate::routing::Router;

pub use cors::CorsPolicy;
pub use handlers::PredictService;
pub use inference::{select_predictor, DummyPredictor, Prediction, Predictor};

/// Errors raised by the prediction service.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The model file is required but absent.
    #[error("model file missing: {0}")]
    ModelMissing(String),

    /// The payload parsed but carries no numeric `x`.
    #[error("x must be a number")]
    InvalidInput,

    /// The payload is not valid JSON (or the result failed to encode).
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// The service's route table.
pub fn routes(service: Arc<PredictService>) -> Router {
    let preflight = Arc::clone(&service);
    Router::new()
        .get("/health", PredictService::health)
        .options("/predict", move |req| preflight.preflight(req))
        .post("/predict", move |req| service.predict(req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorsConfig;

    #[test]
    fn registers_service_routes() {
        let service = Arc::new(PredictService::new(
            Arc::new(DummyPredictor),
            CorsPolicy::from_config(&CorsConfig::default()),
        ));
        let router = routes(service);
        assert_eq!(router.len(), 3);

        assert_eq!(router.dispatch("GET", "/health", Vec::new()).status(), 200);
        assert_eq!(router.dispatch("OPTIONS", "/predict", Vec::new()).status(), 204);
        assert_eq!(router.dispatch("POST", "/predict", br#"{"x":1}"#.to_vec()).status(), 200);
        assert_eq!(router.dispatch("GET", "/unknown", Vec::new()).status(), 404);
        assert_eq!(router.dispatch("DELETE", "/predict", Vec::new()).status(), 405);
        assert_eq!(router.dispatch("GET", "/predict", Vec::new()).status(), 405);
    }
}
