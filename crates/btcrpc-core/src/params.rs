//! Positional parameter lists.
//!
//! The daemon reads parameters by position. Optional trailing parameters may
//! only be left out from the end of the list inward: to pass the Nth optional
//! argument, every optional argument before it must be present too. Each
//! method declares its own slot list, so placeholder defaults are per-method
//! data rather than a global rule.

use serde::Serialize;
use serde_json::Value;

use crate::amount::Amount;
use crate::error::RpcError;

enum Slot {
    Required,
    Optional { default: Value },
}

struct Entry {
    name: &'static str,
    slot: Slot,
    supplied: Option<Value>,
}

/// Builds the ordered parameter list for one call.
///
/// Building is a pure function of the declared slots and the supplied
/// values; conversion failures and missing required values surface from
/// [`build`](Self::build) as [`ErrorKind::InvalidParameter`](crate::ErrorKind).
#[derive(Default)]
pub struct ParamsBuilder {
    entries: Vec<Entry>,
    error: Option<RpcError>,
}

impl ParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that must always be present.
    pub fn required<V: Serialize>(self, name: &'static str, value: V) -> Self {
        self.required_opt(name, Some(value))
    }

    /// A required slot whose value may not have been provided by the caller.
    pub fn required_opt<V: Serialize>(mut self, name: &'static str, value: Option<V>) -> Self {
        let supplied = self.convert(name, value);
        self.entries.push(Entry {
            name,
            slot: Slot::Required,
            supplied,
        });
        self
    }

    /// An optional slot with the value the daemon assumes when it is omitted.
    pub fn optional<V: Serialize, D: Serialize>(
        mut self,
        name: &'static str,
        value: Option<V>,
        default: D,
    ) -> Self {
        let supplied = self.convert(name, value);
        let default = self.convert(name, Some(default)).unwrap_or(Value::Null);
        self.entries.push(Entry {
            name,
            slot: Slot::Optional { default },
            supplied,
        });
        self
    }

    /// A required BTC amount, normalized to eight fractional digits.
    pub fn amount(self, name: &'static str, amount: Amount) -> Self {
        self.required(name, amount)
    }

    pub fn build(self) -> Result<Vec<Value>, RpcError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        for entry in &self.entries {
            if matches!(entry.slot, Slot::Required) && entry.supplied.is_none() {
                return Err(RpcError::invalid_parameter(format!(
                    "missing required parameter `{}`",
                    entry.name
                )));
            }
        }

        // Everything up to the last slot that must be sent is emitted;
        // unsupplied optionals before it fall back to their defaults.
        let keep = self
            .entries
            .iter()
            .rposition(Entry::must_send)
            .map_or(0, |last| last + 1);

        Ok(self
            .entries
            .into_iter()
            .take(keep)
            .map(|entry| match (entry.supplied, entry.slot) {
                (Some(value), _) => value,
                (None, Slot::Optional { default }) => default,
                (None, Slot::Required) => Value::Null,
            })
            .collect())
    }

    fn convert<V: Serialize>(&mut self, name: &'static str, value: Option<V>) -> Option<Value> {
        let value = value?;
        match serde_json::to_value(value) {
            Ok(value) => Some(value),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(RpcError::invalid_parameter(format!(
                        "parameter `{name}`: {e}"
                    )));
                }
                None
            }
        }
    }
}

impl Entry {
    /// Required slots always go out; optional ones only when they differ
    /// from what the daemon would assume anyway.
    fn must_send(&self) -> bool {
        match (&self.slot, &self.supplied) {
            (Slot::Required, _) => true,
            (Slot::Optional { .. }, None) => false,
            (Slot::Optional { default }, Some(value)) => value != default,
        }
    }
}
