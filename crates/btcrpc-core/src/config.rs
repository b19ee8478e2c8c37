use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PROTOCOL_VERSION: &str = "1.0";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the client authenticates against the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    UserPass { user: String, pass: String },
    /// A `username:password` cookie file as written by bitcoind.
    CookieFile(PathBuf),
}

impl Auth {
    /// Pick an auth mode from loose settings.
    ///
    /// Precedence: explicit user and password, then the cookie file, then
    /// no auth. Only one of user/password is an error.
    pub fn from_parts(
        user: Option<String>,
        pass: Option<String>,
        cookie_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        match (user, pass, cookie_file) {
            (Some(user), Some(pass), _) => Ok(Self::UserPass { user, pass }),
            (Some(_), None, _) | (None, Some(_), _) => Err(ConfigError::PartialCredentials),
            (None, None, Some(path)) => Ok(Self::CookieFile(path)),
            (None, None, None) => Ok(Self::None),
        }
    }
}

/// Everything needed to reach one daemon endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub auth: Auth,
    /// Sent as the `jsonrpc` member when set.
    pub protocol_version: Option<String>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: Auth::None,
            protocol_version: Some(DEFAULT_PROTOCOL_VERSION.to_owned()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_protocol_version(mut self, version: Option<String>) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_credentials_win_over_cookie() {
        let auth = Auth::from_parts(
            Some("alice".into()),
            Some("secret".into()),
            Some(PathBuf::from("/tmp/.cookie")),
        )
        .expect("valid");
        assert_eq!(
            auth,
            Auth::UserPass {
                user: "alice".into(),
                pass: "secret".into()
            }
        );
    }

    #[test]
    fn partial_credentials_are_rejected() {
        let err = Auth::from_parts(None, Some("secret".into()), None).expect_err("partial");
        assert!(matches!(err, ConfigError::PartialCredentials));
    }

    #[test]
    fn defaults_match_daemon_expectations() {
        let config = RpcConfig::new("http://127.0.0.1:8332");
        assert_eq!(config.protocol_version.as_deref(), Some("1.0"));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.auth, Auth::None);
    }
}
