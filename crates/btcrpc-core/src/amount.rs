//! Monetary amounts on the wire.
//!
//! bitcoind parses amounts with a strict numeric-literal parser that rejects
//! exponential notation. [`Amount`] is a fixed-point value (satoshis, scale
//! 8) that always serializes as a plain JSON numeral with exactly eight
//! fractional digits, e.g. `0.10000000`.

use std::fmt;
use std::str::FromStr;

use bitcoin::{Denomination, SignedAmount};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RpcError;

/// Number of fractional digits the daemon expects for BTC amounts.
pub const SCALE: usize = 8;

const SATS_PER_BTC: u64 = 100_000_000;

/// A signed BTC amount normalized to eight fractional digits.
///
/// Quoted literals (`"1.00000000"`) are accepted on decode, but encoding
/// always emits a bare numeral. A response that must keep a quoted amount
/// byte for byte has to be decoded as `Response<Value>` instead of a typed
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(SignedAmount);

impl Amount {
    pub const ZERO: Self = Self(SignedAmount::ZERO);

    pub fn from_sat(sats: i64) -> Self {
        Self(SignedAmount::from_sat(sats))
    }

    pub fn to_sat(self) -> i64 {
        self.0.to_sat()
    }

    /// Parse a BTC literal such as `0.1`, `-2.5` or `1.00000000`.
    ///
    /// Exponent forms (`6.6e-6`) are accepted here because the daemon
    /// itself may print them; they are never produced on output.
    pub fn from_btc_str(literal: &str) -> Result<Self, RpcError> {
        let literal = literal.trim();
        if literal.contains(['e', 'E']) {
            let value: f64 = literal
                .parse()
                .map_err(|e| RpcError::invalid_parameter(format!("invalid BTC amount `{literal}`: {e}")))?;
            return Self::from_btc(value);
        }
        SignedAmount::from_str_in(literal, Denomination::Bitcoin)
            .map(Self)
            .map_err(|e| RpcError::invalid_parameter(format!("invalid BTC amount `{literal}`: {e}")))
    }

    /// Convert a floating point BTC value, rejecting values that need more
    /// than eight fractional digits.
    pub fn from_btc(value: f64) -> Result<Self, RpcError> {
        SignedAmount::from_float_in(value, Denomination::Bitcoin)
            .map(Self)
            .map_err(|e| RpcError::invalid_parameter(format!("invalid BTC amount `{value}`: {e}")))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }

    /// Plain decimal rendering with exactly [`SCALE`] fractional digits.
    pub fn to_plain_string(self) -> String {
        let sats = self.0.to_sat();
        let sign = if sats < 0 { "-" } else { "" };
        let abs = sats.unsigned_abs();
        format!(
            "{sign}{}.{:0width$}",
            abs / SATS_PER_BTC,
            abs % SATS_PER_BTC,
            width = SCALE
        )
    }

    /// The amount as a JSON number that keeps its literal form.
    pub fn to_json_number(self) -> Result<serde_json::Number, serde_json::Error> {
        self.to_plain_string().parse()
    }
}

impl From<SignedAmount> for Amount {
    fn from(amount: SignedAmount) -> Self {
        Self(amount)
    }
}

impl From<Amount> for SignedAmount {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl TryFrom<bitcoin::Amount> for Amount {
    type Error = RpcError;

    fn try_from(amount: bitcoin::Amount) -> Result<Self, Self::Error> {
        i64::try_from(amount.to_sat())
            .map(Self::from_sat)
            .map_err(|_| RpcError::invalid_parameter(format!("BTC amount out of range: {amount}")))
    }
}

impl FromStr for Amount {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_btc_str(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_number()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => Self::from_btc_str(&n.to_string()),
            serde_json::Value::String(s) => Self::from_btc_str(&s),
            other => {
                return Err(D::Error::custom(format!(
                    "expected numeric BTC amount, got: {other}"
                )))
            }
        };
        parsed.map_err(|e| D::Error::custom(e.message()))
    }
}
