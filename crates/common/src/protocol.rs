//! Request and response types exchanged over the HTTP API.
//!
//! These types are serialised as JSON. Record bodies themselves are the
//! serialised entity models from the `fieldvault` crate and are passed
//! through as `serde_json::Value`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Token endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /tokens/encrypt` and `POST /tokens/inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRequest {
    /// Text to encrypt or classify.
    pub value: String,
}

/// Response body for `POST /tokens/encrypt`.
///
/// `token` is the base64 encoding of `IV || ciphertext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Request body for `POST /tokens/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Response body for `POST /tokens/decrypt`.
///
/// `value` is the plaintext, the input unchanged when it was not ciphertext
/// or failed to decrypt, or the access-denied sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: String,
}

/// Response body for `POST /tokens/inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectResponse {
    /// Whether the value is classified as possibly-encrypted.
    pub looks_encrypted: bool,
}

// ---------------------------------------------------------------------------
// Record endpoints
// ---------------------------------------------------------------------------

/// Response body for record writes (`POST /records/{kind}`, `PUT /records/{kind}/{key}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSaved {
    /// Record kind identifier, e.g. `"patients"`.
    pub kind: String,
    /// Key under which the record is stored.
    pub key: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Number of record kinds with a registered sensitive-field list.
    pub registered_kinds: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "unknown record kind");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("unknown record kind"));
    }

    #[test]
    fn error_response_from_service_error() {
        let err = ServiceError::NotFound("patients/42".into());
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "not_found");
        assert!(body.message.contains("patients/42"));
    }

    #[test]
    fn inspect_response_field_name() {
        let json = serde_json::to_value(InspectResponse { looks_encrypted: true }).unwrap();
        assert_eq!(json["looks_encrypted"], true);
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            registered_kinds: 6,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.registered_kinds, 6);
    }
}
