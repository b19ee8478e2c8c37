use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;

use crate::rpc::ErrorInfo;

/// Boxed cause attached to transport, protocol and decode failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ==============================================================================
// Error Kind
// ==============================================================================

/// The closed set of failure kinds a call can produce.
///
/// Callers branch on the kind (and on [`RpcError::code`] for remote
/// failures), never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The call shape was rejected locally; nothing was sent.
    InvalidParameter,
    /// No usable HTTP response, or an HTTP error outside 4xx/5xx.
    Transport,
    /// A 4xx/5xx body that is not a JSON-RPC error envelope.
    Protocol,
    /// A 2xx body that does not fit the expected result shape.
    ResponseDecode,
    InvalidAddress,
    WalletState,
    MethodNotFound,
    /// Any other remote error reported with a 5xx status.
    Server,
    /// Any other remote error reported with a 4xx status.
    Client,
}

impl ErrorKind {
    /// `true` for kinds that carry a daemon-reported code and message.
    pub fn is_remote(self) -> bool {
        matches!(
            self,
            Self::InvalidAddress
                | Self::WalletState
                | Self::MethodNotFound
                | Self::Server
                | Self::Client
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::Transport => write!(f, "transport error"),
            Self::Protocol => write!(f, "protocol error"),
            Self::ResponseDecode => write!(f, "response decode error"),
            Self::InvalidAddress => write!(f, "invalid address"),
            Self::WalletState => write!(f, "wallet state error"),
            Self::MethodNotFound => write!(f, "method not found"),
            Self::Server => write!(f, "server error"),
            Self::Client => write!(f, "client error"),
        }
    }
}

// ==============================================================================
// RpcError
// ==============================================================================

/// A failed call.
///
/// Every failure carries its [`ErrorKind`] plus whatever raw context was
/// available when it happened: the numeric code and message reported by
/// the daemon, the HTTP status, and the raw response body.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RpcError {
    kind: ErrorKind,
    code: Option<i64>,
    message: String,
    status: Option<StatusCode>,
    body: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl RpcError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter, message)
    }

    /// No usable HTTP response was obtained.
    pub fn transport(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        let mut err = Self::new(ErrorKind::Transport, format!("HTTP error: {source}"));
        err.source = Some(source);
        err
    }

    /// An HTTP error status outside the 4xx/5xx classes.
    pub fn unexpected_status(status: StatusCode, body: String) -> Self {
        let mut err = Self::new(
            ErrorKind::Transport,
            format!("unexpected HTTP status {status}"),
        );
        err.status = Some(status);
        err.body = Some(body);
        err
    }

    pub fn protocol(
        status: StatusCode,
        body: String,
        reason: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        let mut err = Self::new(
            ErrorKind::Protocol,
            format!("received HTTP {status}; {}", reason.into()),
        );
        err.status = Some(status);
        err.body = Some(body);
        err.source = source;
        err
    }

    pub fn response_decode(status: StatusCode, body: String, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        let mut err = Self::new(
            ErrorKind::ResponseDecode,
            format!("decode JSON-RPC response: {source}"),
        );
        err.status = Some(status);
        err.body = Some(body);
        err.source = Some(source);
        err
    }

    /// A daemon-reported error; the message is kept verbatim.
    pub fn remote(kind: ErrorKind, status: StatusCode, info: ErrorInfo) -> Self {
        Self {
            kind,
            code: Some(info.code),
            message: info.message,
            status: Some(status),
            body: None,
            source: None,
        }
    }

    /// Attach the HTTP status that arrived before a transport failure.
    pub fn with_status(mut self, status: Option<StatusCode>) -> Self {
        if status.is_some() {
            self.status = status;
        }
        self
    }

    /// Attach the raw response body a remote error was read from.
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Numeric code reported by the daemon; `None` when no error envelope
    /// could be read.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

// ==============================================================================
// ConfigError
// ==============================================================================

/// Failures while building a client from an [`RpcConfig`](crate::RpcConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid connection `{connection}`: {reason}")]
    InvalidConnection { connection: String, reason: String },

    #[error("both rpc user and rpc pass must be set together")]
    PartialCredentials,

    #[error("rpc cookie file {}: {reason}", .path.display())]
    Cookie { path: PathBuf, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_keeps_daemon_message_verbatim() {
        let info = ErrorInfo::new(-5, "Invalid Bitcoin address");
        let err = RpcError::remote(
            ErrorKind::InvalidAddress,
            StatusCode::INTERNAL_SERVER_ERROR,
            info,
        );
        assert_eq!(err.message(), "Invalid Bitcoin address");
        assert_eq!(err.code(), Some(-5));
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.to_string(), "invalid address: Invalid Bitcoin address");
    }

    #[test]
    fn protocol_error_has_no_code_but_keeps_body() {
        let err = RpcError::protocol(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>".to_owned(),
            "response parsing failed",
            None,
        );
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.code(), None);
        assert_eq!(err.body(), Some("<html>oops</html>"));
    }

    #[test]
    fn only_daemon_reported_kinds_are_remote() {
        assert!(ErrorKind::MethodNotFound.is_remote());
        assert!(ErrorKind::Server.is_remote());
        assert!(!ErrorKind::Protocol.is_remote());
        assert!(!ErrorKind::Transport.is_remote());
    }
}
