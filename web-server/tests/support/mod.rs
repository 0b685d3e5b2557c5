// Shared fixtures for the gateway integration tests
#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use async_trait::async_trait;
use common::{issue_access_token, Config, StaticFilesConfig, UploadConfig, UpstreamResult};
use reqwest::Method;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use web_server::error::GatewayError;
use web_server::session_registry::SessionRegistryActor;
use web_server::session_store::ActorSessionStore;
use web_server::upstream::{UpstreamApi, UpstreamBody};
use web_server::views::HtmlViews;
use web_server::Gateway;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const SESSION_SECRET: &str = "test-session-secret";

#[derive(Debug, Clone)]
pub struct RecordedFile {
    pub field_name: String,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub json: Option<Value>,
    pub file: Option<RecordedFile>,
}

type Responder = Box<dyn Fn(&RecordedCall) -> Result<UpstreamResult, GatewayError> + Send + Sync>;

/// Scripted stand-in for the upstream REST API
pub struct FakeUpstream {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
}

impl FakeUpstream {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&RecordedCall) -> Result<UpstreamResult, GatewayError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Answers every call with an empty success
    pub fn ok() -> Arc<Self> {
        Self::new(|_| Ok(UpstreamResult::new(200, "ok", Value::Null)))
    }

    pub fn failing(status: u16, message: &'static str) -> Arc<Self> {
        Self::new(move |_| Err(GatewayError::upstream(status, message)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamApi for FakeUpstream {
    async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: UpstreamBody,
    ) -> Result<UpstreamResult, GatewayError> {
        let (json, file) = match body {
            UpstreamBody::Empty => (None, None),
            UpstreamBody::Json(value) => (Some(value), None),
            UpstreamBody::File(attachment) => {
                // The temp file must still exist while upstream streams it
                let contents = std::fs::read(&attachment.path).expect("attachment readable during call");
                let file = RecordedFile {
                    field_name: attachment.field_name,
                    file_name: attachment.file_name,
                    contents,
                };
                (None, Some(file))
            }
        };

        let call = RecordedCall {
            method,
            path: path.to_string(),
            token: token.map(str::to_string),
            json,
            file,
        };
        let result = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        result
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        jwt_secret: JWT_SECRET.into(),
        session_secret: SESSION_SECRET.into(),
        uploads: UploadConfig {
            dir: upload_dir.to_string_lossy().into_owned(),
            ..UploadConfig::default()
        },
        static_files: StaticFilesConfig {
            path: upload_dir.join("no-such-public-dir").to_string_lossy().into_owned(),
        },
        ..Config::default()
    }
}

/// Must run inside an actix system, the session registry is an actor
pub fn gateway(config: &Config, upstream: Arc<FakeUpstream>) -> Gateway {
    use actix::Actor;

    let registry = SessionRegistryActor::new().start();
    Gateway::new(
        config,
        upstream,
        Arc::new(ActorSessionStore::new(registry)),
        Arc::new(HtmlViews),
    )
}

pub fn valid_token() -> String {
    issue_access_token(json!(7), "agent@example.com", 900, JWT_SECRET.as_bytes()).unwrap()
}

pub fn access_cookie(token: &str) -> Cookie<'static> {
    Cookie::new("accessToken", token.to_string())
}

pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Hand-built multipart body with a single `file` field
pub fn multipart_file(file_name: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let boundary = "----gateway-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}
