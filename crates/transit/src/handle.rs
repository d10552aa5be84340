//! Opaque identifiers that stand in for values which cannot cross the boundary as data.
//!
//! Two kinds of identifier exist:
//!
//! - [`Handle`]: minted by the retain table for scripting-side functions and objects. The
//!   wire form is a kind prefix followed by a decimal counter, e.g.
//!   `__TRANSIT_JS_FUNCTION_3` or `__TRANSIT_OBJECT_PROXY_4`.
//! - [`NativeTag`]: carried by stubs that wrap a host-owned callable. The wire form is
//!   `__TRANSIT_NATIVE_FUNCTION_` followed by the host's own native id. Tags need no
//!   retain/release bookkeeping because the host already owns the callable.

use std::{fmt, str::FromStr};

use strum::IntoEnumIterator;

/// Wire prefix of handles that refer to retained scripting-side functions.
pub const FUNCTION_HANDLE_PREFIX: &str = "__TRANSIT_JS_FUNCTION_";

/// Wire prefix of handles that refer to retained scripting-side objects.
pub const OBJECT_HANDLE_PREFIX: &str = "__TRANSIT_OBJECT_PROXY_";

/// Wire prefix of tags that name a host-owned native function.
pub const NATIVE_TAG_PREFIX: &str = "__TRANSIT_NATIVE_FUNCTION_";

/// Kind discriminator embedded in a handle so the receiving side knows how to re-wrap it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter, strum::IntoStaticStr, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum HandleKind {
    /// A scripting-side function the host may call back later.
    Function,
    /// A scripting-side object (including opaque host nodes and uncopyable structures).
    Object,
}

impl HandleKind {
    /// Returns the wire prefix for this kind.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Function => FUNCTION_HANDLE_PREFIX,
            Self::Object => OBJECT_HANDLE_PREFIX,
        }
    }
}

/// A retain-table handle.
///
/// Handles are unique within a bridge's lifetime: the id comes from a counter shared by
/// both kinds that only ever increases, so an id is never handed out twice even after the
/// entry it named has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    kind: HandleKind,
    id: u64,
}

impl Handle {
    /// Creates a handle from its parts.
    ///
    /// Only the retain table mints handles that resolve to anything; handles built here
    /// are useful for parsing host replies and in tests.
    #[must_use]
    pub fn new(kind: HandleKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Returns the kind discriminator.
    #[must_use]
    pub fn kind(self) -> HandleKind {
        self.kind
    }

    /// Returns the raw counter value.
    #[must_use]
    pub fn id(self) -> u64 {
        self.id
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

/// Error returned when a string is not a well-formed handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHandleError {
    input: String,
}

impl ParseHandleError {
    /// The string that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseHandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a transit handle", self.input)
    }
}

impl std::error::Error for ParseHandleError {}

impl FromStr for Handle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandleKind::iter()
            .find_map(|kind| {
                let digits = s.strip_prefix(kind.prefix())?;
                parse_canonical(digits).map(|id| Self::new(kind, id))
            })
            .ok_or_else(|| ParseHandleError { input: s.to_owned() })
    }
}

/// Parses an unsigned decimal in its single canonical spelling: ascii digits only, no
/// sign, no leading zeros.
pub(crate) fn parse_canonical<T: FromStr>(digits: &str) -> Option<T> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !(digits.len() > 1 && digits.starts_with('0'));
    if canonical { digits.parse().ok() } else { None }
}

impl serde::Serialize for Handle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Handle {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Tag carried by a stub wrapping a host-owned native function.
///
/// Proxifying such a stub yields this tag instead of a new handle, so the host can
/// resolve it back to the callable it already owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeTag {
    native_id: String,
}

impl NativeTag {
    /// Creates the tag for a host native id.
    #[must_use]
    pub fn new(native_id: impl Into<String>) -> Self {
        Self {
            native_id: native_id.into(),
        }
    }

    /// Returns the host-assigned native id.
    #[must_use]
    pub fn native_id(&self) -> &str {
        &self.native_id
    }

    /// Parses the wire form, returning `None` when the prefix is missing.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        s.strip_prefix(NATIVE_TAG_PREFIX).map(Self::new)
    }
}

impl fmt::Display for NativeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NATIVE_TAG_PREFIX}{}", self.native_id)
    }
}

impl serde::Serialize for NativeTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for NativeTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("'{raw}' is not a native function tag")))
    }
}
