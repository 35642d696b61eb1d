//! Instance-aware xpaths
//!
//! Provides [`XpathContext`], the ordered list of enclosing groups a display
//! node sits in. Unlike a flat path, an xpath names exactly one occurrence of
//! a question: every repeat instance carries a 1-based subscript.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One enclosing group of an xpath
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XpathSegment {
    /// Group name
    name: String,

    /// 1-based instance number, when this is a repeat instance
    index: Option<usize>,

    /// Whether the group can repeat
    repeatable: bool,
}

impl XpathSegment {
    /// Non-repeating group
    #[inline]
    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            repeatable: false,
        }
    }

    /// Repeat instance at 0-based `position`
    #[inline]
    #[must_use]
    pub fn instance(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(position + 1),
            repeatable: true,
        }
    }

    /// Repeatable group whose data was not stored as instances
    ///
    /// Renders with subscript `1`, the way attachments of such a group are
    /// addressed.
    #[inline]
    #[must_use]
    pub fn unindexed_repeat(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            repeatable: true,
        }
    }

    /// Group name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded 1-based instance number
    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Whether the group can repeat
    #[inline]
    #[must_use]
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// Subscript printed after the name
    #[inline]
    #[must_use]
    pub fn subscript(&self) -> Option<usize> {
        self.index.or(self.repeatable.then_some(1))
    }
}

impl Display for XpathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.subscript() {
            Some(n) => write!(f, "{}[{}]", self.name, n),
            None => f.write_str(&self.name),
        }
    }
}

/// Ordered enclosing groups of a display node
///
/// # Examples
/// - `[]` + `q` → `q`
/// - `[group]` + `q` → `group/q`
/// - `[outer#2, inner#1]` + `q` → `outer[2]/inner[1]/q`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct XpathContext(Vec<XpathSegment>);

impl XpathContext {
    /// Empty context (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<XpathSegment>) -> Self {
        Self(segments)
    }

    /// Segments from outermost to innermost
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[XpathSegment] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root context
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Innermost segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&XpathSegment> {
        self.0.last()
    }

    /// Append a segment, returning new context
    #[inline]
    #[must_use]
    pub fn child(&self, segment: XpathSegment) -> Self {
        let mut new = self.clone();
        new.0.push(segment);
        new
    }

    /// Xpath of a leaf named `leaf` inside this context
    #[must_use]
    pub fn leaf(&self, leaf: &str) -> String {
        if self.0.is_empty() {
            leaf.to_string()
        } else {
            format!("{self}/{leaf}")
        }
    }

    /// Path with every subscript dropped
    #[must_use]
    pub fn flat(&self) -> String {
        self.0
            .iter()
            .map(XpathSegment::name)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Display for XpathContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for XpathContext {
    type Err = XpathError;

    /// Parse `outer[2]/inner[1]/group`
    ///
    /// Subscripted segments parse as repeat instances, bare segments as
    /// groups.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    return Err(XpathError::EmptySegment);
                }
                match seg.split_once('[') {
                    None => Ok(XpathSegment::group(seg)),
                    Some((name, rest)) => {
                        let digits = rest
                            .strip_suffix(']')
                            .ok_or_else(|| XpathError::InvalidSubscript(seg.to_string()))?;
                        let index: usize = digits
                            .parse()
                            .map_err(|_| XpathError::InvalidSubscript(seg.to_string()))?;
                        if name.is_empty() || index == 0 {
                            return Err(XpathError::InvalidSubscript(seg.to_string()));
                        }
                        Ok(XpathSegment::instance(name, index - 1))
                    }
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Errors related to xpaths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XpathError {
    /// Empty segment in path
    #[error("xpath contains empty segment")]
    EmptySegment,

    /// Malformed `[n]` subscript
    #[error("invalid subscript in segment: {0}")]
    InvalidSubscript(String),
}
