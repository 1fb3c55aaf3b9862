// ── Core error types ──
//
// User-facing errors from agrifleet-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<agrifleet_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

use crate::model::MissionStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the fleet backend: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Session expired -- sign in again")]
    SessionExpired,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// A mission status change that the workflow does not allow.
    #[error("Invalid mission transition: {from} -> {to}")]
    InvalidTransition {
        from: MissionStatus,
        to: MissionStatus,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<agrifleet_api::Error> for CoreError {
    fn from(err: agrifleet_api::Error) -> Self {
        match err {
            agrifleet_api::Error::Unauthorized => CoreError::SessionExpired,
            agrifleet_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            agrifleet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            agrifleet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            agrifleet_api::Error::Api { status, message } => {
                // 4xx short of auth failure is a validation/domain rejection;
                // everything else is surfaced as a plain API failure.
                if matches!(status, 400 | 409 | 422) {
                    CoreError::ValidationFailed { message }
                } else {
                    CoreError::Api {
                        message,
                        status: Some(status),
                    }
                }
            }
            agrifleet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
