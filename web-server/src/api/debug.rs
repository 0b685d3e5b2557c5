// web-server/src/api/debug.rs
// Raw session and cookie introspection. Only mounted when explicitly enabled.
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Map, Value};

use crate::error::GatewayError;
use crate::state::GatewayState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/session-data", web::get().to(session_data))
        .route("/cookie-data", web::get().to(cookie_data));
}

async fn session_data(
    req: HttpRequest,
    state: web::Data<GatewayState>,
) -> Result<HttpResponse, GatewayError> {
    let record = match state.cookies.session_id(&req) {
        Some(session_id) => state.sessions.get(&session_id).await?,
        None => None,
    };

    Ok(match record {
        Some(record) => HttpResponse::Ok().json(record),
        None => HttpResponse::Ok().json(json!({})),
    })
}

async fn cookie_data(req: HttpRequest) -> Result<HttpResponse, GatewayError> {
    let cookies = req
        .cookies()
        .map_err(|e| GatewayError::Validation(e.to_string()))?;

    let map: Map<String, Value> = cookies
        .iter()
        .map(|c| (c.name().to_string(), Value::String(c.value().to_string())))
        .collect();

    Ok(HttpResponse::Ok().json(map))
}
