//! Startup orchestration.
//!
//! # Responsibilities
//! - Select the predictor and build the route table
//! - Bind the listener once everything it serves is ready
//!
//! # Design Decisions
//! - Fail fast: a missing required model or a bind failure aborts startup
//! - The route table is frozen before the first connection can arrive

use std::sync::Arc;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::net::{Listener, ListenerError};
use crate::predict::{self, select_predictor, CorsPolicy, PredictError, PredictService};
use crate::routing::Router;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Model(#[from] PredictError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Build the service's route table from configuration.
pub fn build_router(config: &ServerConfig) -> Result<Router, PredictError> {
    let predictor = select_predictor(&config.model)?;
    let cors = CorsPolicy::from_config(&config.cors);
    tracing::info!(
        allow_origin = cors.allow_origin().unwrap_or("<none>"),
        predictor = predictor.name(),
        "Service configured"
    );
    Ok(predict::routes(Arc::new(PredictService::new(predictor, cors))))
}

/// Build the server and bind its listener.
pub async fn start(config: ServerConfig) -> Result<(HttpServer, Listener), StartupError> {
    let router = build_router(&config)?;
    let listener = Listener::bind(&config.listener).await?;
    Ok((HttpServer::new(config, router), listener))
}
