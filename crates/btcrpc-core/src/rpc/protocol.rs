//! JSON-RPC envelopes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::RpcError;
use crate::extensible::{Extensible, Extra, FieldReader, FieldWriter, Presence};

// ==============================================================================
// Request
// ==============================================================================

/// One outbound call as it goes on the wire.
///
/// `jsonrpc` and `id` are omitted when unset; `params` is always present,
/// even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RequestEnvelope {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: None,
            id: None,
            method: method.into(),
            params,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(Value::from(id));
        self
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.jsonrpc = version.map(str::to_owned);
        self
    }

    pub fn to_body(&self) -> Result<String, RpcError> {
        serde_json::to_string(self)
            .map_err(|e| RpcError::invalid_parameter(format!("encode request: {e}")))
    }
}

// ==============================================================================
// Response
// ==============================================================================

crate::extensible_struct! {
    /// The `error` member of a failed call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ErrorInfo {
        "code" => pub code: i64,
        "message" => pub message: String,
    }
}

impl ErrorInfo {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            extra: Extra::new(),
        }
    }
}

/// A decoded response envelope.
///
/// `result`, `error` and `id` keep the difference between a missing member
/// and an explicit `null`, so the envelope re-encodes exactly as received
/// when the input lists them in `result`, `error`, `id` order. Any other
/// top-level member lands in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub result: Presence<T>,
    pub error: Presence<ErrorInfo>,
    pub id: Presence<Value>,
    pub extra: Extra,
}

impl<T> Response<T> {
    pub fn success(result: T, id: Value) -> Self {
        Self {
            result: Presence::Present(result),
            error: Presence::Absent,
            id: Presence::Present(id),
            extra: Extra::new(),
        }
    }

    /// The daemon-reported error, if the `error` member carries one.
    pub fn error_info(&self) -> Option<&ErrorInfo> {
        self.error.as_option()
    }
}

impl Response<Value> {
    /// Decode the `result` member into `R`.
    ///
    /// A missing or `null` result is offered to `R` as `null`: it succeeds
    /// for `()`, `Option<_>` and [`Value`] and fails for anything else.
    pub fn decode_result<R: DeserializeOwned>(self) -> Result<R, serde_json::Error> {
        let value = self.result.into_option().unwrap_or(Value::Null);
        serde_json::from_value(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Response<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut reader = FieldReader::deserialize(deserializer)?;
        Ok(Self {
            result: reader.take_presence::<_, D::Error>("result")?,
            error: reader.take_presence::<_, D::Error>("error")?,
            id: reader.take_presence::<_, D::Error>("id")?,
            extra: reader.finish(),
        })
    }
}

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut writer = FieldWriter::new(serializer)?;
        writer.presence("result", &self.result)?;
        writer.presence("error", &self.error)?;
        writer.presence("id", &self.id)?;
        writer.finish(&self.extra)
    }
}

impl<T> Extensible for Response<T> {
    fn extra(&self) -> &Extra {
        &self.extra
    }
}
