//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    ErrorResponse, HealthResponse, InspectResponse, RecordSaved, TokenRequest, TokenResponse,
    ValueRequest, ValueResponse,
};
use common::ServiceError;
use fieldvault::models::{
    HeeadsssAssessment, ImmunizationRecord, ImmunizationShortcutForm, NcdRiskAssessment, Patient,
    VitalSign,
};
use fieldvault::{Caller, Record, StoreError};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::middleware::caller_from_headers;
use super::state::{AppState, HasStore, Stores};

/// Render a [`ServiceError`] as its status code and JSON body.
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "request failed");
    } else {
        warn!(error = %err, "request rejected");
    }
    (status, Json(ErrorResponse::from(&err))).into_response()
}

fn store_error(err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
        StoreError::Conflict { .. } | StoreError::Redacted { .. } => {
            ServiceError::Conflict(err.to_string())
        }
        StoreError::Backend(_) => ServiceError::Internal(err.to_string()),
    }
}

fn request_caller(state: &AppState, headers: &HeaderMap) -> Caller {
    caller_from_headers(headers, &state.caller_header_name, &state.roles_header_name)
}

/// `GET /health` — liveness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        registered_kinds: state.sweeper.registry().len(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `POST /tokens/encrypt` — encrypt a single value.
pub async fn encrypt_token(
    State(state): State<AppState>,
    Json(req): Json<ValueRequest>,
) -> Response {
    match state.sweeper.protector().try_encrypt(&req.value) {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        Err(e) => error_response(ServiceError::Internal(format!("encryption failed: {e}"))),
    }
}

/// `POST /tokens/decrypt` — decrypt a single token for the request's caller.
///
/// Unauthorized callers receive the access-denied sentinel, not an error.
/// Tokens that are not ciphertext or fail to decrypt come back unchanged.
pub async fn decrypt_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TokenRequest>,
) -> Response {
    let caller = request_caller(&state, &headers);
    let value = state
        .sweeper
        .protector()
        .decrypt_for_caller(&req.token, &caller);
    (StatusCode::OK, Json(ValueResponse { value })).into_response()
}

/// `POST /tokens/inspect` — report whether a value looks like ciphertext.
pub async fn inspect_token(
    State(state): State<AppState>,
    Json(req): Json<ValueRequest>,
) -> Response {
    let looks_encrypted = state.sweeper.protector().looks_encrypted(&req.value);
    (StatusCode::OK, Json(InspectResponse { looks_encrypted })).into_response()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Run `$op::<T>(args…)` for the record type registered under `$kind`.
macro_rules! for_kind {
    ($kind:expr, $op:ident($($arg:expr),* $(,)?)) => {{
        let kind: &str = $kind;
        if kind == Patient::KIND {
            $op::<Patient>($($arg),*)
        } else if kind == VitalSign::KIND {
            $op::<VitalSign>($($arg),*)
        } else if kind == ImmunizationRecord::KIND {
            $op::<ImmunizationRecord>($($arg),*)
        } else if kind == ImmunizationShortcutForm::KIND {
            $op::<ImmunizationShortcutForm>($($arg),*)
        } else if kind == HeeadsssAssessment::KIND {
            $op::<HeeadsssAssessment>($($arg),*)
        } else if kind == NcdRiskAssessment::KIND {
            $op::<NcdRiskAssessment>($($arg),*)
        } else {
            Err(ServiceError::BadRequest(format!("unknown record kind: {kind}")))
        }
    }};
}

fn parse<T: Record + DeserializeOwned>(body: serde_json::Value) -> Result<T, ServiceError> {
    serde_json::from_value(body)
        .map_err(|e| ServiceError::BadRequest(format!("invalid {} record: {e}", T::KIND)))
}

fn create<T>(state: &AppState, caller: Caller, body: serde_json::Value) -> Result<Response, ServiceError>
where
    T: Record + DeserializeOwned,
    Stores: HasStore<T>,
{
    let mut record: T = parse(body)?;
    if record.key().trim().is_empty() {
        record.set_key(Uuid::new_v4().to_string());
    }
    let key = record.key().to_owned();

    let mut ctx = state.context::<T>(caller);
    ctx.add(record).map_err(store_error)?;
    ctx.save_changes().map_err(store_error)?;
    info!(entity = T::KIND, key = %key, "record created");

    let body = RecordSaved {
        kind: T::KIND.into(),
        key,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

fn replace<T>(
    state: &AppState,
    caller: Caller,
    key: String,
    body: serde_json::Value,
) -> Result<Response, ServiceError>
where
    T: Record + DeserializeOwned,
    Stores: HasStore<T>,
{
    // A full replace would overwrite fields the caller was only shown as
    // sentinels, so it needs decrypt rights.
    if !state.sweeper.protector().can_decrypt(&caller) {
        return Err(store_error(StoreError::Redacted { kind: T::KIND }));
    }
    let mut record: T = parse(body)?;
    record.set_key(key.clone());

    let mut ctx = state.context::<T>(caller);
    ctx.update(record).map_err(store_error)?;
    ctx.save_changes().map_err(store_error)?;
    info!(entity = T::KIND, key = %key, "record replaced");

    let body = RecordSaved {
        kind: T::KIND.into(),
        key,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

fn fetch<T>(state: &AppState, caller: Caller, key: &str) -> Result<Response, ServiceError>
where
    T: Record + Serialize,
    Stores: HasStore<T>,
{
    let ctx = state.context::<T>(caller);
    match ctx.find(key).map_err(store_error)? {
        Some(record) => Ok((StatusCode::OK, Json(record)).into_response()),
        None => Err(ServiceError::NotFound(format!("{} record {key:?}", T::KIND))),
    }
}

fn list<T>(state: &AppState, caller: Caller) -> Result<Response, ServiceError>
where
    T: Record + Serialize,
    Stores: HasStore<T>,
{
    let ctx = state.context::<T>(caller);
    let records = ctx.find_all().map_err(store_error)?;
    Ok((StatusCode::OK, Json(records)).into_response())
}

/// `POST /records/:kind` — create a record; a key is assigned when absent.
pub async fn create_record(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let caller = request_caller(&state, &headers);
    for_kind!(&kind, create(&state, caller, body)).unwrap_or_else(error_response)
}

/// `PUT /records/:kind/:key` — replace a stored record.
///
/// Callers that cannot decrypt get 409, as does any body carrying the
/// access-denied sentinel in a sensitive field.
pub async fn replace_record(
    State(state): State<AppState>,
    Path((kind, key)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let caller = request_caller(&state, &headers);
    for_kind!(&kind, replace(&state, caller, key, body)).unwrap_or_else(error_response)
}

/// `GET /records/:kind/:key` — fetch one record, decrypted for the caller.
pub async fn get_record(
    State(state): State<AppState>,
    Path((kind, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let caller = request_caller(&state, &headers);
    for_kind!(&kind, fetch(&state, caller, &key)).unwrap_or_else(error_response)
}

/// `GET /records/:kind` — every record of a kind, decrypted for the caller.
pub async fn list_records(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Response {
    let caller = request_caller(&state, &headers);
    for_kind!(&kind, list(&state, caller)).unwrap_or_else(error_response)
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
