//! CORS response headers for the prediction endpoint.

use crate::config::CorsConfig;
use crate::http::Response;

/// Headers added to every `/predict` response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: Option<String>,
    allow_headers: String,
    allow_methods: String,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            allow_origin: config.allow_origin.clone(),
            allow_headers: config.allow_headers.clone(),
            allow_methods: config.allow_methods.clone(),
        }
    }

    pub fn allow_origin(&self) -> Option<&str> {
        self.allow_origin.as_deref()
    }

    pub fn apply(&self, response: &mut Response) {
        if let Some(origin) = &self.allow_origin {
            response.set_header("Access-Control-Allow-Origin", origin.clone());
        }
        response.set_header("Access-Control-Allow-Headers", self.allow_headers.clone());
        response.set_header("Access-Control-Allow-Methods", self.allow_methods.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_configured_headers() {
        let policy = CorsPolicy::from_config(&CorsConfig::default());
        let mut res = Response::new(204);
        policy.apply(&mut res);
        assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(res.header("Access-Control-Allow-Headers"), Some("Content-Type"));
        assert_eq!(res.header("Access-Control-Allow-Methods"), Some("POST, OPTIONS"));
    }

    #[test]
    fn no_origin_header_without_origin() {
        let config = CorsConfig {
            allow_origin: None,
            ..CorsConfig::default()
        };
        let mut res = Response::new(204);
        CorsPolicy::from_config(&config).apply(&mut res);
        assert_eq!(res.header("Access-Control-Allow-Origin"), None);
        assert!(res.header("Access-Control-Allow-Methods").is_some());
    }
}
