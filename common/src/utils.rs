// Common Crate - utils.rs
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Setup tracing for consistent logging. `RUST_LOG` overrides the default `info` level.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

// Claims carried by the access token the upstream API issues at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

// Sign an HS256 access token valid for `ttl_seconds`
pub fn issue_access_token(
    id: Value,
    email: &str,
    ttl_seconds: usize,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = now_secs();
    let claims = AccessClaims {
        id: Some(id),
        email: Some(email.to_string()),
        exp: now + ttl_seconds,
        iat: Some(now),
        extra: Map::new(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

// Verify signature and expiry, tolerating `leeway_seconds` of clock skew
pub fn verify_access_token(
    token: &str,
    secret: &[u8],
    leeway_seconds: u64,
) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = leeway_seconds;

    let token_data = decode::<AccessClaims>(token, &DecodingKey::from_secret(secret), &validation)?;

    Ok(token_data.claims)
}
