//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store handlers keyed by exact path, then method
//! - Dispatch a parsed request to its handler
//! - Answer 404 / 405 when nothing matches
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locks)
//! - O(1) path lookup via HashMap; no prefix, wildcard or trailing-slash handling
//! - Last registration for a (path, method) pair wins

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// A route handler: a plain function from request to response.
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Static route table.
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<String, HashMap<Method, Handler>>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.routes.keys().collect();
        paths.sort();
        f.debug_struct("Router").field("paths", &paths).finish()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` on `path`, replacing any previous one.
    pub fn route<F>(mut self, path: impl Into<String>, method: Method, handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let path = path.into();
        let replaced = self
            .routes
            .entry(path.clone())
            .or_default()
            .insert(method, Arc::new(handler))
            .is_some();
        if replaced {
            tracing::debug!(path = %path, method = %method, "Route handler replaced");
        }
        self
    }

    pub fn get<F>(self, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.route(path, Method::Get, handler)
    }

    pub fn post<F>(self, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.route(path, Method::Post, handler)
    }

    pub fn options<F>(self, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.route(path, Method::Options, handler)
    }

    /// Number of registered (path, method) pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Methods registered for `path`, in a stable order.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .routes
            .get(path)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        methods.sort_by_key(|m| m.as_str());
        methods
    }

    /// Dispatch a request given its raw method token and path.
    ///
    /// The handler, if any, runs exactly once.
    pub fn dispatch(&self, method: &str, path: &str, body: Vec<u8>) -> Response {
        let Some(handlers) = self.routes.get(path) else {
            return Response::text(404, "Not Found");
        };

        let handler = method
            .parse::<Method>()
            .ok()
            .and_then(|m| handlers.get(&m).map(|h| (m, h)));

        match handler {
            Some((method, handler)) => handler(&Request::new(method, path, body)),
            None => Response::text(405, "Method Not Allowed"),
        }
    }
}
