//! Typed JSON-RPC client core for bitcoind.
//!
//! Calls go through [`RpcClient`]: parameters are laid out positionally by
//! [`ParamsBuilder`], replies decode into shapes that keep unknown members
//! (see [`extensible`]), and failures are classified into [`ErrorKind`].

pub mod amount;
pub mod config;
pub mod error;
pub mod extensible;
pub mod params;
pub mod rpc;
pub mod types;

pub use amount::Amount;
pub use config::{Auth, RpcConfig};
pub use error::{ConfigError, ErrorKind, RpcError};
pub use extensible::{Extensible, Extra, Presence};
pub use params::ParamsBuilder;
pub use rpc::{HttpTransport, ReqwestTransport, Response, RpcClient};

#[doc(hidden)]
pub use serde as __serde;
