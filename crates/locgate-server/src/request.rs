//! Wire types: inbound gate requests and outbound status documents.

use chrono::NaiveDate;
use locgate_core::AccessStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Action requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Check,
    Log,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Check => "check",
            Action::Log => "log",
        }
    }
}

/// A validated gate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub action: Action,
    pub identity: String,
    /// Only meaningful for [`Action::Log`].
    pub tx_hash: Option<String>,
}

/// Reasons a request body is rejected. The `Display` text is the message
/// returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Missing identity")]
    MissingIdentity,

    #[error("Unknown action")]
    UnknownAction,
}

impl GateRequest {
    /// Build a request from already-typed parts, applying the same identity
    /// and `txHash` rules as [`GateRequest::parse`].
    pub fn new(
        action: Action,
        identity: impl Into<String>,
        tx_hash: Option<String>,
    ) -> Result<Self, RequestError> {
        let identity = identity.into();
        if identity.is_empty() {
            return Err(RequestError::MissingIdentity);
        }
        Ok(Self {
            action,
            identity,
            tx_hash: tx_hash.filter(|h| !h.is_empty()),
        })
    }

    /// Validate a raw request body.
    ///
    /// Checks run in order: the body must be a JSON object, then it must carry
    /// a non-empty string `identity`, then `action` must be `check` or `log`.
    /// An empty `txHash` counts as absent.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Err(RequestError::InvalidJson);
        };

        let identity = fields
            .get("identity")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(RequestError::MissingIdentity)?;

        let action = match fields.get("action").and_then(Value::as_str) {
            Some("check") => Action::Check,
            Some("log") => Action::Log,
            _ => return Err(RequestError::UnknownAction),
        };

        let tx_hash = fields
            .get("txHash")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            action,
            identity: identity.to_string(),
            tx_hash,
        })
    }
}

/// Status document returned for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GateResponse {
    None,

    #[serde(rename_all = "camelCase")]
    Active {
        last_paid_date: NaiveDate,
        expires_on: NaiveDate,
    },

    #[serde(rename_all = "camelCase")]
    Expired { last_paid_date: NaiveDate },

    #[serde(rename_all = "camelCase")]
    Logged {
        last_paid_date: NaiveDate,
        expires_on: NaiveDate,
    },

    Error { message: String },
}

impl From<AccessStatus> for GateResponse {
    fn from(status: AccessStatus) -> Self {
        match status {
            AccessStatus::None => GateResponse::None,
            AccessStatus::Active {
                last_paid_date,
                expires_on,
            } => GateResponse::Active {
                last_paid_date,
                expires_on,
            },
            AccessStatus::Expired { last_paid_date } => GateResponse::Expired { last_paid_date },
        }
    }
}

impl From<RequestError> for GateResponse {
    fn from(err: RequestError) -> Self {
        GateResponse::Error {
            message: err.to_string(),
        }
    }
}
