//! CORS policy for browser clients.
//!
//! Policy:
//! - Development: permissive (Allow-Origin: *), without credentials.
//! - Production: allowlist origins from `CORS_ALLOWED_ORIGINS`, without credentials.
//!   An empty allowlist sends no CORS headers at all.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

pub fn layer(config: &Config) -> CorsLayer {
    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static("x-request-id"),
    ])
    .max_age(Duration::from_secs(60 * 10))
}

/// Apply the CORS policy to the given Router.
pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let mut vars: Vec<(String, String)> = vec![("MONGO_URI".into(), "mongodb://h".into())];
        vars.extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    async fn allow_origin(config: &Config, origin: &str) -> Option<String> {
        let app = apply(Router::new().route("/", get(|| async { "ok" })), config);
        let req = Request::get("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn development_allows_any_origin() {
        let config = config(&[]);
        assert_eq!(
            allow_origin(&config, "http://localhost:5173").await.as_deref(),
            Some("*")
        );
    }

    #[tokio::test]
    async fn production_only_allows_listed_origins() {
        let config = config(&[
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "https://aiverse.example"),
        ]);
        assert_eq!(
            allow_origin(&config, "https://aiverse.example").await.as_deref(),
            Some("https://aiverse.example")
        );
        assert_eq!(allow_origin(&config, "https://evil.example").await, None);
    }
}
