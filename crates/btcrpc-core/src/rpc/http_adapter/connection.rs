use std::path::Path;

use reqwest::Url;

use crate::config::Auth;
use crate::error::ConfigError;

pub(super) fn resolve_auth(auth: &Auth) -> Result<Option<(String, String)>, ConfigError> {
    match auth {
        Auth::None => Ok(None),
        Auth::UserPass { user, pass } => Ok(Some((user.clone(), pass.clone()))),
        Auth::CookieFile(path) => read_cookie(path).map(Some),
    }
}

fn read_cookie(path: &Path) -> Result<(String, String), ConfigError> {
    let cookie_err = |reason: String| ConfigError::Cookie {
        path: path.to_owned(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| cookie_err(format!("read failed: {e}")))?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| cookie_err("file is empty".to_owned()))?;

    let (user, pass) = line
        .split_once(':')
        .ok_or_else(|| cookie_err("must contain `username:password`".to_owned()))?;
    if user.is_empty() || pass.is_empty() {
        return Err(cookie_err(
            "must contain non-empty `username:password`".to_owned(),
        ));
    }

    Ok((user.to_owned(), pass.to_owned()))
}

pub(super) fn parse_connection(connection: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidConnection {
        connection: connection.to_owned(),
        reason,
    };

    let parsed = Url::parse(connection).map_err(|e| invalid(format!("expected HTTP(S) URL ({e})")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(connection.to_owned()),
        other => Err(invalid(format!(
            "unsupported scheme `{other}`; expected http or https"
        ))),
    }
}
