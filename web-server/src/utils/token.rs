// web-server/src/utils/token.rs
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Generate a random alphanumeric token of specified length
pub fn generate_secure_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Hash a string using SHA-256
pub fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Create an opaque session id with more entropy
pub fn create_session_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    let random_part = generate_secure_token(32);
    hash_string(&format!("{}-{}", timestamp, random_part))
}

fn mac_for(secret: &[u8], session_id: &str) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(session_id.as_bytes());
    Ok(mac)
}

/// `<id>.<hex hmac>`, the value stored in the session cookie
pub fn sign_session_id(session_id: &str, secret: &[u8]) -> Result<String, InvalidLength> {
    let mac = mac_for(secret, session_id)?;
    Ok(format!("{}.{}", session_id, hex::encode(mac.finalize().into_bytes())))
}

/// Recover the session id from a cookie value, `None` if unsigned or tampered
pub fn unsign_session_id(cookie_value: &str, secret: &[u8]) -> Option<String> {
    let (session_id, signature) = cookie_value.rsplit_once('.')?;
    let signature = hex::decode(signature).ok()?;

    mac_for(secret, session_id).ok()?.verify_slice(&signature).ok()?;

    Some(session_id.to_string())
}
