//! Telemetry setup: structured JSON logs, plus OTLP span export when a
//! collector endpoint is configured.
//!
//! # Telemetry invariants
//!
//! - **No patient data or key material** may appear in any span attribute or
//!   log field. Field-level failures name the entity kind and field only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
