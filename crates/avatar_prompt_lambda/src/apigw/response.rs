use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An HTTP response under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub body: Option<String>,
    pub headers: BTreeMap<String, String>,
}

/// The transport envelope returned to the Lambda runtime. `body` is present
/// only when set; `headers` only when non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_body(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: Some(body.into()),
            headers: BTreeMap::new(),
        }
    }

    /// A JSON error body of the `{"message": ...}` shape.
    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "message": message.into() }).to_string();
        Self::with_body(status_code, body)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(self, name: &str, value: &str) -> Self {
        self.header("Set-Cookie", format!("{name}={value}"))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn to_wire(self) -> WireResponse {
        WireResponse {
            status_code: self.status_code,
            body: self.body,
            headers: self.headers,
        }
    }
}

impl WireResponse {
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).expect("wire response should serialize")
    }
}
