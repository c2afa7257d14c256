//! IPC protocol types for the hookd activation provider.
//!
//! This crate is shared by the control surface and any provider-side tooling
//! to prevent schema drift. The provider remains the authority on what it
//! answers, but clients reuse the same types to construct valid requests.
//!
//! The wire format is a single JSON object per message, terminated by `\n`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// The action token carried by a provider query.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Method {
    /// Ask whether the hook framework has taken effect. No params.
    Active,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub protocol_version: u32,
    pub method: Method,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    /// Builds an activation query with no payload.
    pub fn active(id: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            method: Method::Active,
            id: Some(id.into()),
            params: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl Response {
    pub fn ok(id: Option<String>, data: Value) -> Self {
        Self {
            ok: true,
            id,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(id: Option<String>, code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id,
            data: None,
            error: Some(ErrorInfo::new(code, message)),
        }
    }
}

/// Extracts the `active` boolean from a provider response.
///
/// Returns `None` for error responses and for responses whose data lacks a
/// boolean `active` field. Callers treat `None` as "no signal", not as an
/// error: the provider is loosely typed and optional.
pub fn active_signal(response: &Response) -> Option<bool> {
    if !response.ok {
        return None;
    }
    response.data.as_ref()?.get("active")?.as_bool()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_request_round_trips() {
        let request = Request::active("probe-1");
        let bytes = serde_json::to_vec(&request).unwrap();
        let parsed: Request = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.protocol_version, PROTOCOL_VERSION);
        assert_eq!(parsed.method, Method::Active);
        assert_eq!(parsed.id.as_deref(), Some("probe-1"));
        assert!(parsed.params.is_none());
    }

    #[test]
    fn active_signal_reads_true() {
        let response = Response::ok(None, serde_json::json!({"active": true}));
        assert_eq!(active_signal(&response), Some(true));
    }

    #[test]
    fn active_signal_reads_false() {
        let response = Response::ok(None, serde_json::json!({"active": false}));
        assert_eq!(active_signal(&response), Some(false));
    }

    #[test]
    fn active_signal_ignores_error_responses() {
        let response = Response::error(None, "provider_down", "not running");
        assert_eq!(active_signal(&response), None);
    }

    #[test]
    fn active_signal_requires_boolean_field() {
        let response = Response::ok(None, serde_json::json!({"active": "yes"}));
        assert_eq!(active_signal(&response), None);

        let response = Response::ok(None, serde_json::json!({"status": "ok"}));
        assert_eq!(active_signal(&response), None);
    }

    #[test]
    fn active_signal_requires_data() {
        let response = Response {
            ok: true,
            id: None,
            data: None,
            error: None,
        };
        assert_eq!(active_signal(&response), None);
    }

    #[test]
    fn rejects_unknown_method() {
        let raw = r#"{"protocol_version":1,"method":"shutdown"}"#;
        assert!(serde_json::from_str::<Request>(raw).is_err());
    }
}
