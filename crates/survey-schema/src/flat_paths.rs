//! Flat path resolution
//!
//! Provides [`FlatPaths`], the precomputed index from row name to the
//! canonical slash-delimited path of that row. The index is a pure function
//! of the schema: build it once per schema and share it.

use indexmap::IndexMap;

use crate::classify::{classify, RowRole};
use crate::row::SchemaRow;

/// Which rows receive a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlatPathOptions {
    /// Give begin rows (groups, repeats, matrices, score/rank) a path
    pub include_groups: bool,
    /// Give metadata rows a path
    pub include_meta: bool,
}

impl FlatPathOptions {
    /// Questions only
    #[inline]
    #[must_use]
    pub fn questions() -> Self {
        Self::default()
    }

    /// Questions and groups, as the display tree needs
    #[inline]
    #[must_use]
    pub fn with_groups() -> Self {
        Self {
            include_groups: true,
            include_meta: false,
        }
    }

    /// Also include metadata rows
    #[inline]
    #[must_use]
    pub fn and_meta(mut self) -> Self {
        self.include_meta = true;
        self
    }
}

/// Row name → canonical flat path, in schema order
///
/// # Examples
/// A question `q1` inside group `g` inside repeat `r` resolves to `r/g/q1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatPaths {
    paths: IndexMap<String, String>,
}

impl FlatPaths {
    /// Resolve every row of the survey
    ///
    /// Begin/end rows are matched as a stack. An end row with no open block
    /// is ignored. When two rows share a name, the later row wins.
    #[must_use]
    pub fn resolve(survey: &[SchemaRow], options: FlatPathOptions) -> Self {
        let mut paths = IndexMap::new();
        let mut open_groups: Vec<&str> = Vec::new();

        for row in survey {
            let role = classify(row);
            let name = row.row_name();

            match role {
                RowRole::Begin(_) => {
                    let segment = name.unwrap_or_default();
                    open_groups.push(segment);
                    if options.include_groups {
                        if let Some(name) = name {
                            paths.insert(name.to_string(), open_groups.join("/"));
                        }
                    }
                }
                RowRole::End(_) => {
                    open_groups.pop();
                }
                RowRole::Question(_) | RowRole::ScoreRankLeaf | RowRole::NoValue => {
                    if let Some(name) = name {
                        paths.insert(name.to_string(), join_under(&open_groups, name));
                    }
                }
                RowRole::Meta => {
                    if let (true, Some(name)) = (options.include_meta, name) {
                        paths.insert(name.to_string(), join_under(&open_groups, name));
                    }
                }
                RowRole::Unknown => {}
            }
        }

        Self { paths }
    }

    /// Path of a row by effective name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.paths.get(name).map(String::as_str)
    }

    /// Number of resolved rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing resolved
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// `(name, path)` pairs in schema order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(name, path)` pairs strictly nested under `group_path`
    pub fn nested_under<'a>(
        &'a self,
        group_path: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.iter().filter(move |(_, path)| {
            path.strip_prefix(group_path)
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Whether `name` is an immediate child of the group named `parent`
    ///
    /// With no parent the row must sit at the root, i.e. its path equals its
    /// name. Membership is decided by exact path equality only.
    #[must_use]
    pub fn is_immediate_child(&self, name: &str, parent: Option<&str>) -> bool {
        let Some(path) = self.get(name) else {
            return false;
        };
        match parent {
            None => path == name,
            Some(parent) => self
                .get(parent)
                .is_some_and(|parent_path| path == format!("{parent_path}/{name}")),
        }
    }
}

fn join_under(open_groups: &[&str], name: &str) -> String {
    if open_groups.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", open_groups.join("/"), name)
    }
}
