// web-server/src/middleware/rate_limiter.rs
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    web, Error, HttpResponse,
};
use common::RateLimitConfig;
use dashmap::DashMap;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::state::GatewayState;
use crate::views::View;

pub const TOO_MANY_ATTEMPTS: &str = "Too many attempts. Please try again later.";

/// Sliding-window limiter for credential submissions, keyed by the socket peer IP.
/// Forwarded-for headers are client-controlled and never used as the key.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Arc<DashMap<String, VecDeque<Instant>>>,
    last_sweep: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_secs(config.window_seconds))
    }

    /// Record an attempt; `true` when the client is over its budget
    fn is_rate_limited(&self, ip: &str, now: Instant) -> bool {
        self.maybe_sweep(now);

        let mut entry = self.attempts.entry(ip.to_string()).or_default();
        let window = &mut *entry;

        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.max_attempts {
            true
        } else {
            window.push_back(now);
            false
        }
    }

    /// Drop clients whose newest attempt left the window. Runs at most once per window.
    fn maybe_sweep(&self, now: Instant) {
        let Ok(mut last_sweep) = self.last_sweep.lock() else {
            return;
        };
        if now.saturating_duration_since(*last_sweep) < self.window {
            return;
        }
        *last_sweep = now;
        drop(last_sweep);

        let window = self.window;
        self.attempts.retain(|_, attempts| {
            attempts
                .back()
                .map_or(false, |newest| now.saturating_duration_since(*newest) < window)
        });
    }
}

/// 429 answer: the form the client was submitting with an error, or plain text without app state
fn rejection(req: &ServiceRequest, retry_after: u64) -> HttpResponse {
    let retry_after = (header::RETRY_AFTER, retry_after.to_string());

    let Some(state) = req.app_data::<web::Data<GatewayState>>() else {
        return HttpResponse::TooManyRequests()
            .insert_header(retry_after)
            .body(TOO_MANY_ATTEMPTS);
    };

    let error = Some(TOO_MANY_ATTEMPTS.to_string());
    let view = if req.path().ends_with("/register") {
        View::Register { error, success: None }
    } else {
        View::Login { error, success: None }
    };

    let mut response = state.render(StatusCode::TOO_MANY_REQUESTS, &view);
    if let Ok(value) = header::HeaderValue::from_str(&retry_after.1) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if self.limiter.is_rate_limited(&ip, Instant::now()) {
            tracing::warn!(%ip, path = %req.path(), "Rate limit exceeded");
            let response = rejection(&req, self.limiter.window.as_secs().max(1));
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
