//! Request middleware: request ids, bearer auth, and rate limiting.
//!
//! Auth and rate-limit settings come from [`AppConfig`] so the whole
//! surface is driven by the same env-backed configuration as the rest of
//! the process. Rejections reuse the API error envelope, request id
//! included, so clients see one error shape everywhere.

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use specdb_core::{AppConfig, Environment};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token auth settings.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth settings from the loaded [`AppConfig`].
    ///
    /// An empty key list disables auth for local iteration, but only in
    /// the development environment; anywhere else it fails startup.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let keys: HashSet<String> = config.api_keys.iter().cloned().collect();

        if keys.is_empty() {
            if config.env == Environment::Development {
                tracing::warn!(
                    "SPECDB_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self {
                    api_keys: Arc::new(HashSet::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "SPECDB_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys.contains(token)
    }
}

#[derive(Debug)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

impl RateLimitWindow {
    /// Admit or reject one request at `now`, resetting the window when
    /// `span` has elapsed since it started.
    fn admit(&mut self, now: Instant, max_requests: usize, span: Duration) -> bool {
        if now.duration_since(self.started_at) >= span {
            self.started_at = now;
            self.count = 0;
        }

        if self.count >= max_requests {
            return false;
        }

        self.count += 1;
        true
    }
}

/// Process-wide fixed-window limiter.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.api_rate_limit_max_requests,
            Duration::from_secs(config.api_rate_limit_window_secs),
        )
    }

    async fn try_admit(&self) -> bool {
        let mut window = self.state.lock().await;
        window.admit(Instant::now(), self.max_requests, self.window)
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response(),
    }
}

/// Middleware enforcing the fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.try_admit().await {
        return next.run(req).await;
    }

    ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded").into_response()
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
