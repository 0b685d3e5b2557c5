// web-server/src/state.rs
use actix_web::{http::StatusCode, HttpResponse};
use std::sync::Arc;

use crate::cookies::CookieSettings;
use crate::response::ResponseFormatter;
use crate::session_store::SessionStore;
use crate::upload::UploadPolicy;
use crate::upstream::UpstreamApi;
use crate::views::{render_view, View, ViewRenderer};

/// Dependencies shared by every handler; the only cross-request state is the session store
#[derive(Clone)]
pub struct GatewayState {
    pub upstream: Arc<dyn UpstreamApi>,
    pub sessions: Arc<dyn SessionStore>,
    pub views: Arc<dyn ViewRenderer>,
    pub responses: ResponseFormatter,
    pub cookies: CookieSettings,
    pub uploads: UploadPolicy,
}

impl GatewayState {
    pub fn render(&self, status: StatusCode, view: &View) -> HttpResponse {
        render_view(self.views.as_ref(), status, view)
    }
}
