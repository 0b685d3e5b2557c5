// web-server/src/api/pages.rs
use actix_web::{http::StatusCode, web, HttpResponse};

use crate::state::GatewayState;
use crate::views::View;

pub async fn login_page(state: web::Data<GatewayState>) -> HttpResponse {
    state.render(StatusCode::OK, &View::login())
}

pub async fn register_page(state: web::Data<GatewayState>) -> HttpResponse {
    state.render(StatusCode::OK, &View::register())
}

pub async fn upload_page(state: web::Data<GatewayState>) -> HttpResponse {
    state.render(StatusCode::OK, &View::Upload)
}
