mod cli;

use std::process::ExitCode;
use std::time::Duration;

use btcrpc_core::{Auth, ErrorKind, RpcClient, RpcConfig, RpcError};
use clap::Parser;
use eyre::WrapErr;
use serde_json::Value;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let auth = Auth::from_parts(
        args.rpc_user.clone(),
        args.rpc_pass.clone(),
        args.rpc_cookie_file.clone(),
    )
    .wrap_err("resolve RPC credentials")?;
    let config = RpcConfig::new(&args.rpc_url)
        .with_auth(auth)
        .with_protocol_version(args.protocol_version())
        .with_timeouts(
            Duration::from_secs(args.connect_timeout),
            Duration::from_secs(args.timeout),
        );
    let rpc = RpcClient::new(&config).wrap_err("configure RPC client")?;

    let params = args.params();
    tracing::debug!(method = %args.method, params = params.len(), "issuing call");

    match rpc.call::<Value>(&args.method, params).await {
        Ok(result) => {
            let rendered = serde_json::to_string_pretty(&result).wrap_err("render result")?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", format_rpc_error(&args.rpc_url, &err));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn format_rpc_error(rpc_url: &str, err: &RpcError) -> String {
    let mut lines = vec![match err.code() {
        Some(code) => format!("error: {} (code {code}): {}", err.kind(), err.message()),
        None => format!("error: {}: {}", err.kind(), err.message()),
    }];

    if let Some(hint) = hint_for(err) {
        lines.push(format!("hint: {hint} (endpoint `{rpc_url}`)"));
    }

    lines.join("\n")
}

fn hint_for(err: &RpcError) -> Option<&'static str> {
    let status = err.status().map(|s| s.as_u16());
    match (err.kind(), status) {
        (ErrorKind::Transport, None) => {
            Some("request could not be sent; verify URL, network access and that bitcoind is running")
        }
        (ErrorKind::Protocol, Some(401 | 403)) => {
            Some("authentication failed; verify --rpc-user/--rpc-pass or --rpc-cookie-file")
        }
        (ErrorKind::Protocol, Some(404)) => {
            Some("endpoint path is invalid; verify the full RPC URL")
        }
        (ErrorKind::Transport, Some(300..=399)) => {
            Some("endpoint answered with a redirect; point --rpc-url at the final address")
        }
        (ErrorKind::MethodNotFound, _) => {
            Some("the daemon does not know this method; check `help` for the available commands")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use btcrpc_core::rpc::ErrorInfo;
    use btcrpc_core::rpc::StatusCode;

    use super::*;

    #[test]
    fn remote_error_shows_kind_code_and_message() {
        let err = RpcError::remote(
            ErrorKind::InvalidAddress,
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorInfo::new(-5, "Invalid Bitcoin address"),
        );
        assert_eq!(
            format_rpc_error("http://127.0.0.1:8332", &err),
            "error: invalid address (code -5): Invalid Bitcoin address"
        );
    }

    #[test]
    fn auth_failure_gets_a_hint() {
        let err = RpcError::protocol(
            StatusCode::UNAUTHORIZED,
            String::new(),
            "response parsing failed",
            None,
        );
        let text = format_rpc_error("http://127.0.0.1:8332", &err);
        assert!(text.starts_with("error: protocol error: "));
        assert!(text.contains("hint: authentication failed"));
    }

    #[test]
    fn redirect_gets_a_hint() {
        let err = RpcError::unexpected_status(StatusCode::TEMPORARY_REDIRECT, String::new());
        let text = format_rpc_error("http://127.0.0.1:8332", &err);
        assert!(text.contains("hint: endpoint answered with a redirect"));
    }

    #[test]
    fn unreachable_node_gets_a_hint() {
        let err = RpcError::transport("connection refused");
        let text = format_rpc_error("http://127.0.0.1:8332", &err);
        assert!(text.contains("hint: request could not be sent"));
    }
}
