//! Codec settings.

use serde::{Deserialize, Serialize};

/// Default nesting limit for decoding.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Default element budget for one decoded container.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 20;

/// Settings shared by [`Encoder`](crate::Encoder) and
/// [`Decoder`](crate::Decoder).
///
/// Missing fields take their defaults when deserialized, so a config can be
/// loaded from a partial document:
///
/// ```
/// use bbdata::CodecConfig;
///
/// let config: CodecConfig = serde_json::from_str(r#"{"max_depth": 16}"#).unwrap();
/// assert!(config.homogeneous);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Write maps and lists whose values all share one tag in the compact
    /// `$` form. When off, every container uses the `#` form.
    pub homogeneous: bool,
    /// Maximum container nesting accepted by the decoder.
    pub max_depth: usize,
    /// Largest element count the decoder accepts in a `#` or `$` container
    /// header. Larger counts fail with [`Error::InvalidSize`](crate::Error::InvalidSize).
    pub max_elements: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            homogeneous: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_homogeneous(mut self, homogeneous: bool) -> Self {
        self.homogeneous = homogeneous;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::new();
        assert!(config.homogeneous);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_elements, DEFAULT_MAX_ELEMENTS);
    }

    #[test]
    fn test_builder_and_serde() {
        let config = CodecConfig::new()
            .with_homogeneous(false)
            .with_max_depth(3)
            .with_max_elements(10);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"homogeneous":false,"max_depth":3,"max_elements":10}"#
        );

        let back: CodecConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: CodecConfig = serde_json::from_str(r#"{"homogeneous":false}"#).unwrap();
        assert_eq!(partial.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(partial.max_elements, DEFAULT_MAX_ELEMENTS);
    }
}
