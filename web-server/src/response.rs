// web-server/src/response.rs
use actix_web::{http::StatusCode, HttpResponse};
use common::Envelope;
use serde_json::Value;

use crate::error::GatewayError;

/// Wraps outgoing JSON in the `{statusCode, success, message, data}` envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn send(
        &self,
        status_code: u16,
        success: bool,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> HttpResponse {
        let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = Envelope::new(status.as_u16(), success, message, data);
        HttpResponse::build(status).json(envelope)
    }

    pub fn error(&self, err: &GatewayError) -> HttpResponse {
        self.send(err.status(), false, err.message(), None)
    }
}
