use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::WebError;

/// Rejects requests whose bearer token is not a configured API key.
///
/// Usage: `.route_layer(middleware::from_fn_with_state(api_keys, require_auth))`
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match token {
        Some(token) if api_keys.is_valid(token) => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
        None => {
            tracing::warn!(path = %req.uri().path(), "Missing bearer token");
            Err(WebError::Unauthorized)
        }
    }
}

#[derive(Clone, Default)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::post};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/rebuild", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                ApiKeys::from_comma_separated(" key-one, ,key-two "),
                require_auth,
            ))
    }

    async fn status_with(auth: Option<&str>) -> StatusCode {
        let mut request = axum::http::Request::builder().method("POST").uri("/rebuild");
        if let Some(auth) = auth {
            request = request.header(header::AUTHORIZATION, auth);
        }

        app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_parses_comma_separated_keys() {
        let keys = ApiKeys::from_comma_separated("a, b,,c ");
        assert!(keys.is_valid("a"));
        assert!(keys.is_valid("b"));
        assert!(keys.is_valid("c"));
        assert!(!keys.is_valid(""));
        assert!(ApiKeys::from_comma_separated(" , ").is_empty());
    }

    #[tokio::test]
    async fn test_accepts_configured_key() {
        assert_eq!(status_with(Some("Bearer key-two")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_unknown_or_missing_key() {
        assert_eq!(
            status_with(Some("Bearer nope")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_with(Some("key-one")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_with(None).await, StatusCode::UNAUTHORIZED);
    }
}
