//! Route handlers for the prediction service.

use std::sync::Arc;

use serde_json::Value;

use crate::http::{Request, Response};
use crate::predict::cors::CorsPolicy;
use crate::predict::inference::Predictor;
use crate::predict::PredictError;

const JSON: &str = "application/json";

/// Shared state behind the `/predict` handlers.
pub struct PredictService {
    predictor: Arc<dyn Predictor>,
    cors: CorsPolicy,
}

impl PredictService {
    pub fn new(predictor: Arc<dyn Predictor>, cors: CorsPolicy) -> Self {
        Self { predictor, cors }
    }

    /// `GET /health`
    pub fn health(_req: &Request) -> Response {
        Response::text(200, "ok")
    }

    /// `OPTIONS /predict`
    pub fn preflight(&self, _req: &Request) -> Response {
        let mut res = Response::new(204);
        self.cors.apply(&mut res);
        res
    }

    /// `POST /predict`
    pub fn predict(&self, req: &Request) -> Response {
        let mut res = match self.run(req.body()) {
            Ok(body) => Response::new(200).with_body(body),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected prediction input");
                Response::new(400).with_body(error_body(&e.to_string()))
            }
        };
        res.set_header("Content-Type", JSON);
        self.cors.apply(&mut res);
        res
    }

    fn run(&self, body: &[u8]) -> Result<Vec<u8>, PredictError> {
        let x = parse_input(body)?;
        let prediction = self.predictor.predict(x);
        tracing::debug!(x, y = prediction.y, predictor = self.predictor.name(), "Prediction");
        Ok(serde_json::to_vec(&prediction)?)
    }
}

/// Extract the numeric `x` field from a JSON payload.
fn parse_input(body: &[u8]) -> Result<f32, PredictError> {
    let value: Value = serde_json::from_slice(body)?;
    value
        .get("x")
        .and_then(Value::as_f64)
        .map(|x| x as f32)
        .ok_or(PredictError::InvalidInput)
}

fn error_body(message: &str) -> Vec<u8> {
    serde_json::json!({ "error": message }).to_string().into_bytes()
}
