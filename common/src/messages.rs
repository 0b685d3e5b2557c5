// Common Crate - messages.rs
// Wire shapes shared by the gateway and its tests
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform JSON envelope returned by the gateway's API-style routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    /// Always serialized, `null` when absent
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(status_code: u16, success: bool, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status_code,
            success,
            message: message.into(),
            data,
        }
    }
}

/// Normalized result of every successful upstream call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResult {
    pub status: u16,
    pub message: String,
    pub data: Value,
}

impl UpstreamResult {
    pub fn new(status: u16, message: impl Into<String>, data: Value) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// `data` as a list, empty when upstream sent nothing usable
    pub fn data_list(&self) -> Vec<Value> {
        match &self.data {
            Value::Array(items) => items.clone(),
            _ => Vec::new(),
        }
    }
}
