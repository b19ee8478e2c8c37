//! Round-trip decode model for daemon JSON objects.
//!
//! A shape declared with [`extensible_struct!`](crate::extensible_struct)
//! decodes its declared members into typed fields and keeps every other
//! member, in wire order, in an [`Extra`] map. Re-encoding emits declared
//! members in their canonical order followed by the extras, so for any
//! input that follows the canonical order `encode(decode(json)) == json`.
//!
//! The daemon's schema evolves independently of this client; a member that
//! has no declared field yet still survives the round trip.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Undeclared members in the order they appeared on the wire.
pub type Extra = Map<String, Value>;

/// Implemented by every shape with a capture-all map.
pub trait Extensible {
    fn extra(&self) -> &Extra;

    /// Names of members that were not mapped to a declared field.
    ///
    /// Used by tests to detect schema drift: a fully mapped sample returns
    /// an empty list.
    fn unmapped_fields(&self) -> Vec<&str> {
        self.extra().keys().map(String::as_str).collect()
    }
}

// ==============================================================================
// Decoding
// ==============================================================================

/// Consumes the members of one JSON object field by field.
pub struct FieldReader {
    members: Map<String, Value>,
}

impl FieldReader {
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let members = Map::deserialize(deserializer)?;
        Ok(Self { members })
    }

    /// Remove `name` and decode it into `T`.
    ///
    /// An absent member decodes as `null`, so `Option` fields become `None`
    /// and required fields report a missing field.
    pub fn take<T, E>(&mut self, name: &'static str) -> Result<T, E>
    where
        T: DeserializeOwned,
        E: serde::de::Error,
    {
        match self.members.shift_remove(name) {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| E::custom(format!("{name}: {e}")))
            }
            None => serde_json::from_value(Value::Null).map_err(|_| E::missing_field(name)),
        }
    }

    /// Remove `name`, keeping the difference between absent and `null`.
    pub fn take_presence<T, E>(&mut self, name: &'static str) -> Result<Presence<T>, E>
    where
        T: DeserializeOwned,
        E: serde::de::Error,
    {
        match self.members.shift_remove(name) {
            None => Ok(Presence::Absent),
            Some(Value::Null) => Ok(Presence::Null),
            Some(value) => serde_json::from_value(value)
                .map(Presence::Present)
                .map_err(|e| E::custom(format!("{name}: {e}"))),
        }
    }

    /// Whatever was not taken, in wire order.
    pub fn finish(self) -> Extra {
        self.members
    }
}

// ==============================================================================
// Encoding
// ==============================================================================

/// Emits declared members in canonical order, then the extras.
pub struct FieldWriter<M> {
    map: M,
}

impl<M: SerializeMap> FieldWriter<M> {
    pub fn new<S>(serializer: S) -> Result<Self, S::Error>
    where
        S: Serializer<SerializeMap = M>,
    {
        Ok(Self {
            map: serializer.serialize_map(None)?,
        })
    }

    /// Always emitted; `None` is written as `null`.
    pub fn field<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), M::Error> {
        self.map.serialize_entry(name, value)
    }

    /// Omitted entirely when `None`.
    pub fn field_if_some<T: Serialize>(
        &mut self,
        name: &str,
        value: &Option<T>,
    ) -> Result<(), M::Error> {
        match value {
            Some(value) => self.map.serialize_entry(name, value),
            None => Ok(()),
        }
    }

    /// Omitted when absent, `null` when null.
    pub fn presence<T: Serialize>(&mut self, name: &str, value: &Presence<T>) -> Result<(), M::Error> {
        match value {
            Presence::Absent => Ok(()),
            Presence::Null => self.map.serialize_entry(name, &Value::Null),
            Presence::Present(value) => self.map.serialize_entry(name, value),
        }
    }

    pub fn finish(mut self, extra: &Extra) -> Result<M::Ok, M::Error> {
        for (name, value) in extra {
            self.map.serialize_entry(name, value)?;
        }
        self.map.end()
    }
}

// ==============================================================================
// Presence
// ==============================================================================

/// A member that may be missing, explicitly `null`, or carry a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Presence<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Presence<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

// ==============================================================================
// Shape Declaration
// ==============================================================================

/// Declare a response shape with a capture-all map.
///
/// Each member is written as `"wire_name" => field: Type`. Append `[skip_none]`
/// after the wire name for `Option` members the daemon omits instead of
/// sending `null`. Members are emitted in declaration order.
///
/// ```
/// btcrpc_core::extensible_struct! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Balance {
///         "account" => pub account: String,
///         "label" [skip_none] => pub label: Option<String>,
///     }
/// }
///
/// let json = r#"{"account":"","label":"x","fresh":1}"#;
/// let balance: Balance = serde_json::from_str(json).unwrap();
/// assert_eq!(balance.extra.len(), 1);
/// assert_eq!(serde_json::to_string(&balance).unwrap(), json);
/// ```
#[macro_export]
macro_rules! extensible_struct {
    (@write $writer:ident, $wire:literal, $value:expr) => {
        $writer.field($wire, $value)?
    };
    (@write $writer:ident, $wire:literal, $value:expr, skip_none) => {
        $writer.field_if_some($wire, $value)?
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $wire:literal $([$rule:ident])? => $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
            /// Members with no declared field, in wire order.
            pub extra: $crate::extensible::Extra,
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                #[allow(unused_mut)]
                let mut reader = $crate::extensible::FieldReader::deserialize(deserializer)?;
                Ok(Self {
                    $( $field: reader.take::<_, D::Error>($wire)?, )*
                    extra: reader.finish(),
                })
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                #[allow(unused_mut)]
                let mut writer = $crate::extensible::FieldWriter::new(serializer)?;
                $( $crate::extensible_struct!(@write writer, $wire, &self.$field $(, $rule)?); )*
                writer.finish(&self.extra)
            }
        }

        impl $crate::extensible::Extensible for $name {
            fn extra(&self) -> &$crate::extensible::Extra {
                &self.extra
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::extensible_struct! {
        #[derive(Debug, Clone, PartialEq)]
        struct Sample {
            "known" => known: u64,
            "note" [skip_none] => note: Option<String>,
            "label" => label: Option<String>,
        }
    }

    #[test]
    fn undeclared_members_round_trip_in_wire_order() {
        let json = r#"{"known":1,"label":null,"zeta":"z","alpha":[1,2],"mid":{"b":1,"a":2}}"#;
        let sample: Sample = serde_json::from_str(json).expect("decode");
        assert_eq!(sample.known, 1);
        assert_eq!(sample.unmapped_fields(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(serde_json::to_string(&sample).expect("encode"), json);
    }

    #[test]
    fn skip_none_member_is_omitted_and_plain_option_is_null() {
        let sample = Sample {
            known: 7,
            note: None,
            label: None,
            extra: Extra::new(),
        };
        assert_eq!(
            serde_json::to_string(&sample).expect("encode"),
            r#"{"known":7,"label":null}"#
        );
    }

    #[test]
    fn missing_required_member_fails() {
        let err = serde_json::from_str::<Sample>(r#"{"label":"x"}"#).expect_err("known missing");
        assert!(err.to_string().contains("known"));
    }

    #[test]
    fn mistyped_member_names_the_field() {
        let err = serde_json::from_str::<Sample>(r#"{"known":"one"}"#).expect_err("bad type");
        assert!(err.to_string().contains("known"));
    }

    #[test]
    fn numeric_literals_survive_unchanged() {
        let json = r#"{"known":3,"label":"x","fee":0.00010000,"big":123456789012345678901234567890}"#;
        let sample: Sample = serde_json::from_str(json).expect("decode");
        assert_eq!(serde_json::to_string(&sample).expect("encode"), json);
    }

    #[test]
    fn presence_distinguishes_absent_from_null() {
        let mut reader = FieldReader {
            members: serde_json::from_str(r#"{"a":null,"b":2}"#).expect("object"),
        };
        let a: Presence<u8> = reader.take_presence::<_, serde_json::Error>("a").expect("a");
        let b: Presence<u8> = reader.take_presence::<_, serde_json::Error>("b").expect("b");
        let c: Presence<u8> = reader.take_presence::<_, serde_json::Error>("c").expect("c");
        assert_eq!(a, Presence::Null);
        assert_eq!(b, Presence::Present(2));
        assert_eq!(c, Presence::Absent);
        assert!(reader.finish().is_empty());
    }
}
