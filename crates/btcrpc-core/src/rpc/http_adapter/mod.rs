//! JSON-RPC client over HTTP(S).
//!
//! [`RpcClient`] performs single calls with basic auth through any
//! [`HttpTransport`](super::HttpTransport); [`ReqwestTransport`] is the
//! `reqwest`-backed default.

mod client;
mod connection;
mod transport;

pub use client::RpcClient;
pub use transport::ReqwestTransport;
