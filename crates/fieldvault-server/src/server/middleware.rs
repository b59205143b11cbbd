//! Request-level plumbing applied to every route: limits, timeouts and the
//! caller identity supplied by the authentication gateway.

use std::time::Duration;

use axum::http::HeaderMap;
use fieldvault::{Caller, RoleSet};

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum accepted request body size.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Build the [`Caller`] of a request from the gateway headers.
///
/// A request without a usable subject header is anonymous; a missing roles
/// header means no roles.
pub fn caller_from_headers(headers: &HeaderMap, caller_header: &str, roles_header: &str) -> Caller {
    let subject = headers
        .get(caller_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let Some(subject) = subject else {
        return Caller::Anonymous;
    };

    let roles = headers
        .get(roles_header)
        .and_then(|v| v.to_str().ok())
        .map(RoleSet::from_csv)
        .unwrap_or_default();

    Caller::authenticated(subject, roles)
}
