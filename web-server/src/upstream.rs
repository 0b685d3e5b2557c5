// web-server/src/upstream.rs
use async_trait::async_trait;
use common::UpstreamResult;
use reqwest::{multipart, Body, Client, Method, Response};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio_util::io::ReaderStream;

use crate::error::GatewayError;

const FALLBACK_MESSAGE: &str = "API request failed";

/// Upstream endpoint paths, appended to the configured base URL
pub mod endpoints {
    pub const AGENTS_UPLOAD: &str = "/upload";
    pub const AGENTS_LIST: &str = "/upload/agents";
    pub const AGENTS_FILTER: &str = "/upload";
    pub const USER_REGISTER: &str = "/auth/register";
    pub const USER_LOGIN: &str = "/auth/login";
}

/// A file on disk forwarded as a multipart field
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub field_name: String,
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub enum UpstreamBody {
    Empty,
    Json(Value),
    File(FileAttachment),
}

#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Issue one request. Failure is either `GatewayError::Upstream` or `GatewayError::Transport`.
    async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: UpstreamBody,
    ) -> Result<UpstreamResult, GatewayError>;
}

/// reqwest-backed client for the upstream REST API
#[derive(Clone)]
pub struct HttpUpstreamClient {
    client: Client,
    base_url: String,
}

impl HttpUpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        // No timeout: spreadsheet uploads may be arbitrarily large
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn file_part(attachment: &FileAttachment) -> Result<multipart::Part, GatewayError> {
        let file = tokio::fs::File::open(&attachment.path).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));
        let mime = mime_guess::from_path(&attachment.file_name).first_or_octet_stream();

        multipart::Part::stream_with_length(body, attachment.size_bytes)
            .file_name(attachment.file_name.clone())
            .mime_str(mime.as_ref())
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstreamClient {
    async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: UpstreamBody,
    ) -> Result<UpstreamResult, GatewayError> {
        let url = self.build_url(path);
        tracing::info!(%method, %url, payload = %describe_payload(&body), "Calling upstream API");

        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        request = match body {
            UpstreamBody::Empty => request,
            UpstreamBody::Json(value) => request.json(&value),
            UpstreamBody::File(attachment) => {
                let part = Self::file_part(&attachment).await?;
                request.multipart(multipart::Form::new().part(attachment.field_name, part))
            }
        };

        match request.send().await {
            Ok(response) => normalize_response(response).await,
            Err(e) => {
                tracing::error!(%url, "Upstream request failed: {}", e);
                Err(GatewayError::Transport(e.to_string()))
            }
        }
    }
}

/// Map a received response onto the common result/error shape
async fn normalize_response(response: Response) -> Result<UpstreamResult, GatewayError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    let body: Option<Map<String, Value>> = serde_json::from_slice(&bytes).ok();

    normalize_body(status.as_u16(), status.is_success(), body)
}

fn normalize_body(
    http_status: u16,
    is_success: bool,
    body: Option<Map<String, Value>>,
) -> Result<UpstreamResult, GatewayError> {
    let Some(body) = body else {
        return Err(GatewayError::upstream(http_status, FALLBACK_MESSAGE));
    };

    let message = body.get("message").and_then(Value::as_str).map(str::to_string);
    let embedded_status = ["statusCode", "status"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_u64))
        .and_then(|s| u16::try_from(s).ok());

    if !is_success {
        return Err(GatewayError::upstream(
            http_status,
            message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        ));
    }

    if body.get("success") == Some(&Value::Bool(false)) {
        return Err(GatewayError::upstream(
            embedded_status.unwrap_or(http_status),
            message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        ));
    }

    Ok(UpstreamResult::new(
        embedded_status.unwrap_or(http_status),
        message.unwrap_or_default(),
        body.get("data").cloned().unwrap_or(Value::Null),
    ))
}

/// Log-safe rendering of a request body
fn describe_payload(body: &UpstreamBody) -> String {
    match body {
        UpstreamBody::Empty => "null".to_string(),
        UpstreamBody::Json(value) => redact(value).to_string(),
        UpstreamBody::File(attachment) => format!(
            "file {} ({} bytes)",
            attachment.file_name, attachment.size_bytes
        ),
    }
}

fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    if key.to_ascii_lowercase().contains("password") {
                        (key.clone(), Value::String("[redacted]".into()))
                    } else {
                        (key.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}
