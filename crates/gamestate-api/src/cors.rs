//! CORS policy applied to every response.
//!
//! The policy runs as an Axum middleware around the whole router, so it
//! also covers the JSON 404 fallback, method mismatches and error
//! responses. `OPTIONS` requests on any path are answered here as CORS
//! preflights and never reach a handler.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Methods advertised to browsers.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Request headers advertised to browsers.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// How long browsers may cache a preflight result (24 hours).
pub const PREFLIGHT_MAX_AGE_SECS: &str = "86400";

/// The configured origin could not be used as a header value.
#[derive(Debug, thiserror::Error)]
#[error("allowed origin {origin:?} is not a valid header value")]
pub struct InvalidOrigin {
    /// The rejected origin.
    pub origin: String,
}

/// Cross-origin policy for one server instance.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origin: HeaderValue,
}

impl CorsPolicy {
    /// Build a policy allowing `origin` (`*` for any).
    pub fn new(origin: &str) -> Result<Self, InvalidOrigin> {
        let allowed_origin = HeaderValue::from_str(origin).map_err(|_err| InvalidOrigin {
            origin: origin.to_owned(),
        })?;
        Ok(Self { allowed_origin })
    }

    /// The origin sent in `Access-Control-Allow-Origin`.
    pub const fn allowed_origin(&self) -> &HeaderValue {
        &self.allowed_origin
    }

    /// Overwrite the CORS headers on `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allowed_origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
        );
    }
}

/// Middleware: answer preflights, stamp CORS headers on everything else.
pub async fn apply_cors(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        (StatusCode::OK, Body::empty()).into_response()
    } else {
        next.run(request).await
    };
    policy.apply(response.headers_mut());
    response
}
