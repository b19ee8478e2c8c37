use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

/// btcrpc: issue one JSON-RPC call against bitcoind and print the result.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// bitcoind RPC URL.
    #[arg(long, default_value = "http://127.0.0.1:8332", env = "BTCRPC_URL")]
    pub rpc_url: String,

    /// RPC username; must be given together with --rpc-pass.
    #[arg(long, env = "BTCRPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password; must be given together with --rpc-user.
    #[arg(long, env = "BTCRPC_PASS", hide_env_values = true)]
    pub rpc_pass: Option<String>,

    /// Cookie file (`username:password`) used when no user/pass is given.
    #[arg(long, env = "BTCRPC_COOKIE_FILE")]
    pub rpc_cookie_file: Option<PathBuf>,

    /// Value of the `jsonrpc` request member; empty to omit it.
    #[arg(long, default_value = "1.0")]
    pub jsonrpc: String,

    /// TCP connect timeout in seconds.
    #[arg(long, default_value = "10")]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// RPC method name, e.g. `getblockcount`.
    pub method: String,

    /// Positional parameters. Valid JSON is sent as JSON, anything else as a
    /// string.
    pub params: Vec<String>,
}

impl Cli {
    pub fn params(&self) -> Vec<Value> {
        self.params.iter().map(|raw| parse_param(raw)).collect()
    }

    pub fn protocol_version(&self) -> Option<String> {
        (!self.jsonrpc.is_empty()).then(|| self.jsonrpc.clone())
    }
}

/// Interpret one command line argument the way `bitcoin-cli` does.
pub fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
