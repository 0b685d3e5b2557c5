// web-server/src/lib.rs
pub mod api;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod response;
pub mod session_registry;
pub mod session_store;
pub mod state;
pub mod static_files;
pub mod upload;
pub mod upstream;
pub mod utils;
pub mod views;

use actix::{Actor, Addr};
use actix_web::web;
use common::Config;
use std::sync::Arc;

use crate::cookies::CookieSettings;
use crate::error::GatewayError;
use crate::middleware::{RateLimiter, TokenGate, TokenVerifier};
use crate::response::ResponseFormatter;
use crate::session_registry::{SessionRegistryActor, StopRegistry};
use crate::session_store::{ActorSessionStore, SessionStore};
use crate::state::GatewayState;
use crate::static_files::StaticAssets;
use crate::upload::UploadPolicy;
use crate::upstream::{HttpUpstreamClient, UpstreamApi};
use crate::views::{HtmlViews, ViewRenderer};

/// Everything needed to mount the gateway into an actix `App`
#[derive(Clone)]
pub struct Gateway {
    state: web::Data<GatewayState>,
    gate: TokenGate,
    limiter: RateLimiter,
    static_assets: Option<StaticAssets>,
    expose_debug_endpoints: bool,
    /// Set when this gateway started its own registry
    registry: Option<Addr<SessionRegistryActor>>,
}

impl Gateway {
    /// Assemble the gateway around explicit collaborators
    pub fn new(
        config: &Config,
        upstream: Arc<dyn UpstreamApi>,
        sessions: Arc<dyn SessionStore>,
        views: Arc<dyn ViewRenderer>,
    ) -> Self {
        let state = GatewayState {
            upstream,
            sessions,
            views,
            responses: ResponseFormatter,
            cookies: CookieSettings::from_config(config),
            uploads: UploadPolicy::from(&config.uploads),
        };

        Self {
            state: web::Data::new(state),
            gate: TokenGate::new(TokenVerifier::new(&config.access_token, &config.jwt_secret)),
            limiter: RateLimiter::from_config(&config.rate_limit),
            static_assets: StaticAssets::from_config(&config.static_files),
            expose_debug_endpoints: config.expose_debug_endpoints,
            registry: None,
        }
    }

    /// Production wiring: reqwest upstream client, actor-backed sessions, HTML views.
    /// Must be called from within a running actix system.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let upstream = HttpUpstreamClient::new(config.api_base_url.clone())?;
        let registry = SessionRegistryActor::new()
            .with_ttl(config.session.ttl_seconds)
            .with_cleanup_interval(config.session.cleanup_interval_seconds)
            .start();

        let mut gateway = Self::new(
            config,
            Arc::new(upstream),
            Arc::new(ActorSessionStore::new(registry.clone())),
            Arc::new(HtmlViews),
        );
        gateway.registry = Some(registry);
        Ok(gateway)
    }

    /// Stop the session registry started by `from_config`, cancelling its cleanup timer
    pub async fn shutdown(&self) {
        if let Some(registry) = &self.registry {
            if let Err(e) = registry.send(StopRegistry).await {
                tracing::warn!("Session registry already stopped: {}", e);
            }
        }
    }

    pub fn state(&self) -> web::Data<GatewayState> {
        self.state.clone()
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.state.clone());

        api::configure(cfg, &self.gate, &self.limiter);

        if self.expose_debug_endpoints {
            tracing::warn!("Debug endpoints /session-data and /cookie-data are enabled");
            api::debug::configure(cfg);
        }

        // Lowest priority, after every route
        if let Some(assets) = &self.static_assets {
            static_files::configure(cfg, assets);
        }
    }
}
