// web-server/src/middleware/token_gate.rs
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use common::{verify_access_token, AccessClaims, AccessTokenConfig};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::cookies::removal;

/// Unauthenticated entry point every gate failure lands on
pub const ENTRY_PATH: &str = "/";

/// Identity attached to requests that passed the gate
#[derive(Debug, Clone)]
pub struct AuthenticatedAgent {
    /// Raw token, forwarded upstream as the bearer credential
    pub token: String,
    pub claims: AccessClaims,
}

/// Stateless access-token check: signature and expiry only
#[derive(Clone)]
pub struct TokenVerifier {
    cookie_name: String,
    secret: Vec<u8>,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(config: &AccessTokenConfig, jwt_secret: &str) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            secret: jwt_secret.as_bytes().to_vec(),
            leeway_seconds: config.leeway_seconds,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn verify(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        verify_access_token(token, &self.secret, self.leeway_seconds)
    }
}

/// Redirects to the entry page, optionally clearing the stale token cookie
fn redirect_to_entry(clear_cookie: Option<&str>) -> HttpResponse {
    let mut response = HttpResponse::Found();
    response.insert_header((header::LOCATION, ENTRY_PATH));
    if let Some(name) = clear_cookie {
        response.cookie(removal(name));
    }
    response.finish()
}

/// Middleware gating a resource on a valid access-token cookie
#[derive(Clone)]
pub struct TokenGate {
    verifier: Arc<TokenVerifier>,
}

impl TokenGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TokenGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = TokenGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenGateMiddleware {
            service,
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct TokenGateMiddleware<S> {
    service: S,
    verifier: Arc<TokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for TokenGateMiddleware<S>
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
        let token = req
            .cookie(self.verifier.cookie_name())
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());

        let Some(token) = token else {
            tracing::debug!(path = %req.path(), "No access token, redirecting to entry");
            let response = redirect_to_entry(None);
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        };

        match self.verifier.verify(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthenticatedAgent { token, claims });
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), "Invalid access token: {}", e);
                let response = redirect_to_entry(Some(self.verifier.cookie_name()));
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}
