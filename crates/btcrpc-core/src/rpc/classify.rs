//! Mapping failed responses onto [`ErrorKind`].
//!
//! Classification is keyed by the HTTP status class and the numeric code in
//! the `error` member. Only a few codes get a specific kind; every other
//! code falls through to the generic kind of its status class.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::{ErrorKind, RpcError};

use super::protocol::{ErrorInfo, Response};

/// Error codes reported by bitcoind.
pub mod codes {
    pub const MISC_ERROR: i64 = -1;
    pub const WALLET_ERROR: i64 = -4;
    pub const INVALID_ADDRESS_OR_KEY: i64 = -5;
    pub const WALLET_UNLOCK_NEEDED: i64 = -13;
    pub const WALLET_PASSPHRASE_INCORRECT: i64 = -14;
    pub const WALLET_WRONG_ENC_STATE: i64 = -15;
    pub const WALLET_ALREADY_UNLOCKED: i64 = -17;

    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const PARSE_ERROR: i64 = -32700;
}

/// HTTP status classes that carry a JSON-RPC error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Client,
    Server,
}

impl StatusClass {
    pub fn of(status: StatusCode) -> Option<Self> {
        if status.is_client_error() {
            Some(Self::Client)
        } else if status.is_server_error() {
            Some(Self::Server)
        } else {
            None
        }
    }

    /// Class used for an error member found in a success-status body.
    ///
    /// Request-level codes are the client's fault; everything else is
    /// treated as a server-side failure.
    pub fn for_embedded(code: i64) -> Self {
        match code {
            codes::INVALID_REQUEST | codes::METHOD_NOT_FOUND => Self::Client,
            _ => Self::Server,
        }
    }
}

/// Pure `(status class, code) -> kind` mapping.
pub fn classify(class: StatusClass, code: i64) -> ErrorKind {
    match (class, code) {
        (StatusClass::Server, codes::INVALID_ADDRESS_OR_KEY) => ErrorKind::InvalidAddress,
        (StatusClass::Server, codes::WALLET_WRONG_ENC_STATE) => ErrorKind::WalletState,
        (StatusClass::Server, _) => ErrorKind::Server,
        (StatusClass::Client, codes::METHOD_NOT_FOUND) => ErrorKind::MethodNotFound,
        (StatusClass::Client, _) => ErrorKind::Client,
    }
}

/// Turn one non-success HTTP response into exactly one [`RpcError`].
pub fn classify_failure(status: StatusCode, body: String) -> RpcError {
    let Some(class) = StatusClass::of(status) else {
        debug!(%status, "unexpected HTTP status");
        return RpcError::unexpected_status(status, body);
    };

    let envelope: Response<Value> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(%status, error = %e, "error body is not a JSON-RPC envelope");
            return RpcError::protocol(status, body, "response parsing failed", Some(Box::new(e)));
        }
    };

    match envelope.error.into_option() {
        Some(info) => remote_error(class, status, info, body),
        None => {
            debug!(%status, "error response without an error member");
            RpcError::protocol(status, body, "response has no error member", None)
        }
    }
}

/// Classify an error member that arrived with a success status.
pub fn classify_embedded(status: StatusCode, info: ErrorInfo, body: String) -> RpcError {
    let class = StatusClass::for_embedded(info.code);
    remote_error(class, status, info, body)
}

fn remote_error(class: StatusClass, status: StatusCode, info: ErrorInfo, body: String) -> RpcError {
    let kind = classify(class, info.code);
    debug!(%status, rpc.code = info.code, %kind, "rpc error");
    RpcError::remote(kind, status, info).with_body(body)
}
