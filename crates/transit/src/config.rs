/// Maximum nesting depth accepted by the structural copy.
///
/// Values nested deeper than this are treated as non-serializable and retained whole,
/// which protects the Rust call stack from adversarially deep structures.
///
/// Lower in debug mode to avoid stack overflow (debug builds use more stack space
/// per call frame).
#[cfg(debug_assertions)]
pub const MAX_COPY_DEPTH: usize = 100;

/// Maximum nesting depth accepted by the structural copy.
///
/// Values nested deeper than this are treated as non-serializable and retained whole.
#[cfg(not(debug_assertions))]
pub const MAX_COPY_DEPTH: usize = 500;

/// Tunables for a [`Bridge`](crate::Bridge).
///
/// Every field has a default, so a partial JSON document is a valid config:
///
/// ```
/// use transit::BridgeConfig;
///
/// let config = BridgeConfig::from_json(r#"{"max_copy_depth": 8}"#).unwrap();
/// assert_eq!(config.max_copy_depth, 8);
/// assert!(config.reuse_handles_within_call);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Deepest nesting the structural copy will follow before giving up and retaining.
    pub max_copy_depth: usize,
    /// When set, a heap value that occurs several times in one proxify call (or one
    /// invocation) is retained once and every occurrence carries the same handle.
    /// When cleared, every occurrence mints its own handle.
    pub reuse_handles_within_call: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_copy_depth: MAX_COPY_DEPTH,
            reuse_handles_within_call: true,
        }
    }
}

impl BridgeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the maximum structural copy depth.
    #[must_use]
    pub fn max_copy_depth(mut self, limit: usize) -> Self {
        self.max_copy_depth = limit;
        self
    }

    /// Enables or disables handle reuse within a single call.
    #[must_use]
    pub fn reuse_handles_within_call(mut self, reuse: bool) -> Self {
        self.reuse_handles_within_call = reuse;
        self
    }
}
