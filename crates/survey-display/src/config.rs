//! Display configuration

use serde::{Deserialize, Serialize};

/// Display tree configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Position of the label translation to show
    ///
    /// Rows missing this translation show their name instead.
    pub translation_index: usize,
    /// Whether supplemental entries follow their source responses
    pub include_supplemental: bool,
}

impl DisplayConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With translation index
    #[inline]
    #[must_use]
    pub fn with_translation_index(mut self, index: usize) -> Self {
        self.translation_index = index;
        self
    }

    /// With or without supplemental entries
    #[inline]
    #[must_use]
    pub fn with_supplemental(mut self, include: bool) -> Self {
        self.include_supplemental = include;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            translation_index: 0,
            include_supplemental: true,
        }
    }
}
