use std::fmt;

use indexmap::IndexMap;
use serde::{
    Serialize,
    ser::{SerializeMap, SerializeSeq},
};

use crate::handle::{Handle, NativeTag, parse_canonical};

/// Largest integer an f64 represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A value in its boundary-safe representation.
///
/// This is what the host receives in an [`InvocationDescriptor`](crate::InvocationDescriptor):
/// primitives pass through, plain structures arrive as inert copies, and anything that
/// cannot be copied arrives as a [`Handle`] or [`NativeTag`].
///
/// # JSON rendering
///
/// `Proxied` serializes to natural JSON:
/// - `Undefined` and `Null` → `null`
/// - `Bool`, `String` → JSON boolean/string
/// - `Number` → JSON integer when it is integral and exactly representable, JSON float
///   otherwise (non-finite numbers → `null`)
/// - `Array` / `Object` → JSON array / object (key order preserved)
/// - `Handle` / `NativeTag` → their prefixed wire strings
///
/// Deserialization goes through [`Proxied::from_json_value`], so strings carrying a
/// handle or tag prefix come back as `Handle`/`NativeTag`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Proxied {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Self>),
    Object(IndexMap<String, Self>),
    /// A retained scripting-side function or object.
    Handle(Handle),
    /// A host-owned native function.
    NativeTag(NativeTag),
}

impl Proxied {
    /// Returns the handle if this value is one.
    #[must_use]
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            Self::Handle(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Returns the native tag if this value is one.
    #[must_use]
    pub fn as_native_tag(&self) -> Option<&NativeTag> {
        match self {
            Self::NativeTag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Looks up a key of a copied object, or an index of a copied array.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(map) => map.get(key),
            Self::Array(items) => parse_canonical::<usize>(key).and_then(|index| items.get(index)),
            _ => None,
        }
    }

    /// Returns `true` for the variants that can hold nested values.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Converts this value to a `serde_json::Value` using the natural JSON rendering.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::Value as JV;
        match self {
            Self::Undefined | Self::Null => JV::Null,
            Self::Bool(b) => JV::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => JV::String(s.clone()),
            Self::Array(items) => JV::Array(items.iter().map(Self::to_json_value).collect()),
            Self::Object(map) => JV::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json_value())).collect()),
            Self::Handle(handle) => JV::String(handle.to_string()),
            Self::NativeTag(tag) => JV::String(tag.to_string()),
        }
    }

    /// Converts natural JSON back into a `Proxied` value.
    ///
    /// Strings with a handle prefix become `Handle`, strings with the native tag prefix
    /// become `NativeTag`; everything else maps structurally. `null` maps to `Null`
    /// (JSON cannot express `undefined`).
    #[must_use]
    pub fn from_json_value(value: serde_json::Value) -> Self {
        use serde_json::Value as JV;
        match value {
            JV::Null => Self::Null,
            JV::Bool(b) => Self::Bool(b),
            JV::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            JV::String(s) => {
                if let Ok(handle) = s.parse::<Handle>() {
                    Self::Handle(handle)
                } else if let Some(tag) = NativeTag::parse(&s) {
                    Self::NativeTag(tag)
                } else {
                    Self::String(s)
                }
            }
            JV::Array(items) => Self::Array(items.into_iter().map(Self::from_json_value).collect()),
            JV::Object(map) => Self::Object(map.into_iter().map(|(k, v)| (k, Self::from_json_value(v))).collect()),
        }
    }
}

#[expect(clippy::cast_possible_truncation, reason = "integral and within the safe range")]
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl fmt::Display for Proxied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            _ => write!(f, "{}", self.to_json_value()),
        }
    }
}

impl Serialize for Proxied {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => number_to_json(*n).serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Self::Handle(handle) => handle.serialize(serializer),
            Self::NativeTag(tag) => tag.serialize(serializer),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Proxied {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_json_value)
    }
}

impl From<Handle> for Proxied {
    fn from(handle: Handle) -> Self {
        Self::Handle(handle)
    }
}

impl From<NativeTag> for Proxied {
    fn from(tag: NativeTag) -> Self {
        Self::NativeTag(tag)
    }
}

impl From<&str> for Proxied {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<f64> for Proxied {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Proxied {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Proxied {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
