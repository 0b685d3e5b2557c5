// web-server/src/cookies.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use common::Config;

use crate::error::GatewayError;
use crate::utils::token::{sign_session_id, unsign_session_id};

/// Names, lifetimes and flags of the two cookies the gateway manages
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub session_name: String,
    pub session_max_age_seconds: i64,
    pub access_name: String,
    pub access_max_age_seconds: i64,
    pub secure: bool,
    session_secret: Vec<u8>,
}

impl CookieSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            session_name: config.session.cookie_name.clone(),
            session_max_age_seconds: config.session.ttl_seconds,
            access_name: config.access_token.cookie_name.clone(),
            access_max_age_seconds: config.access_token.max_age_seconds,
            secure: config.is_production(),
            session_secret: config.session_secret.as_bytes().to_vec(),
        }
    }

    /// Signed session id, httpOnly, 24h by default
    pub fn session_cookie(&self, session_id: &str) -> Result<Cookie<'static>, GatewayError> {
        let signed = sign_session_id(session_id, &self.session_secret)
            .map_err(|e| GatewayError::Internal(format!("cannot sign session id: {}", e)))?;

        Ok(Cookie::build(self.session_name.clone(), signed)
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.session_max_age_seconds))
            .finish())
    }

    /// Bearer token issued by upstream, httpOnly + strict same-site, 15 minutes by default
    pub fn access_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(self.access_name.clone(), token.to_string())
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::seconds(self.access_max_age_seconds))
            .finish()
    }

    pub fn clear_session(&self) -> Cookie<'static> {
        removal(&self.session_name)
    }

    pub fn clear_access(&self) -> Cookie<'static> {
        removal(&self.access_name)
    }

    /// Session id from a correctly signed session cookie
    pub fn session_id(&self, req: &HttpRequest) -> Option<String> {
        let cookie = req.cookie(&self.session_name)?;
        let session_id = unsign_session_id(cookie.value(), &self.session_secret);
        if session_id.is_none() {
            tracing::warn!("Ignoring session cookie with an invalid signature");
        }
        session_id
    }
}

/// Empty cookie that expires immediately
pub fn removal(name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string(), "")
        .path("/")
        .max_age(CookieDuration::seconds(0))
        .finish()
}
