//! Component-trie set of absolute paths with a minimal-cover invariant
//!
//! The covering relation is defined over path components, never raw string
//! prefixes: `/a/b` covers `/a/b/c` and `/a/b` itself, but not `/a/bc`.

use std::collections::BTreeMap;

use crate::error::PruneError;

/// Outcome of a single [`PathSet::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// An existing member already covers the candidate; the set is unchanged
    Covered,
    /// The candidate became a member, replacing `replaced` more-specific members
    Inserted {
        /// Number of existing members the candidate covered and displaced
        replaced: usize,
    },
}

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    member: bool,
}

impl Node {
    fn member_count(&self) -> usize {
        usize::from(self.member)
            + self
                .children
                .values()
                .map(Node::member_count)
                .sum::<usize>()
    }

    fn collect_paths(&self, prefix: &mut String, out: &mut Vec<String>) {
        if self.member {
            if prefix.is_empty() {
                out.push("/".to_string());
            } else {
                out.push(prefix.clone());
            }
        }
        for (name, child) in &self.children {
            let saved = prefix.len();
            prefix.push('/');
            prefix.push_str(name);
            child.collect_paths(prefix, out);
            prefix.truncate(saved);
        }
    }
}

/// A set of absolute paths in which no member is an ancestor-or-equal of
/// another member.
///
/// Members are stored in a trie keyed on path components, so insertion
/// resolves both "is this already covered" and "which members does this
/// replace" by walking at most `depth` components instead of scanning the
/// whole set. The set is the sole mutable state of a reduction run: created
/// empty, mutated once per candidate, emitted sorted, discarded.
#[derive(Debug, Default)]
pub struct PathSet {
    root: Node,
    len: usize,
}

impl PathSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a candidate path, maintaining the minimal-cover invariant.
    ///
    /// If an existing member covers `path`, the set is unchanged. Otherwise
    /// `path` becomes a member and every existing member it covers is
    /// removed. Inserting a path already in the set is a no-op.
    pub fn insert(&mut self, path: &str) -> Result<Insertion, PruneError> {
        let comps = components(path)?;

        if self.walk_is_covered(&comps) {
            return Ok(Insertion::Covered);
        }

        let mut node = &mut self.root;
        for comp in &comps {
            node = node.children.entry((*comp).to_string()).or_default();
        }
        // Not covered, so this node itself cannot be a member; everything
        // below it is now subsumed.
        let replaced = node.member_count();
        node.children.clear();
        node.member = true;
        self.len = self.len + 1 - replaced;
        Ok(Insertion::Inserted { replaced })
    }

    /// Does some member cover `path` (ancestor-or-equal by component)?
    pub fn covers(&self, path: &str) -> Result<bool, PruneError> {
        let comps = components(path)?;
        Ok(self.walk_is_covered(&comps))
    }

    /// Is `path` itself a member?
    pub fn contains(&self, path: &str) -> Result<bool, PruneError> {
        let comps = components(path)?;
        let mut node = &self.root;
        for comp in &comps {
            match node.children.get(*comp) {
                Some(child) => node = child,
                None => return Ok(false),
            }
        }
        Ok(node.member)
    }

    /// The members `path` covers (descendants-or-equal), sorted.
    ///
    /// These are exactly the members an [`insert`](Self::insert) of `path`
    /// would displace, or `[path]` itself if it is already a member.
    pub fn covered_by(&self, path: &str) -> Result<Vec<String>, PruneError> {
        let comps = components(path)?;
        let mut node = &self.root;
        for comp in &comps {
            match node.children.get(*comp) {
                Some(child) => node = child,
                None => return Ok(Vec::new()),
            }
        }
        let mut prefix = String::new();
        for comp in &comps {
            prefix.push('/');
            prefix.push_str(comp);
        }
        let mut out = Vec::new();
        node.collect_paths(&mut prefix, &mut out);
        out.sort();
        Ok(out)
    }

    /// All members, rendered as absolute paths and sorted lexicographically.
    ///
    /// Sorting is over the full path string, not trie order; the two differ
    /// when a component contains bytes that sort below `/`.
    pub fn sorted_paths(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len);
        let mut prefix = String::new();
        self.root.collect_paths(&mut prefix, &mut out);
        out.sort();
        out
    }

    fn walk_is_covered(&self, comps: &[&str]) -> bool {
        let mut node = &self.root;
        if node.member {
            // "/" is a member and covers every absolute path
            return true;
        }
        for comp in comps {
            match node.children.get(*comp) {
                Some(child) => {
                    node = child;
                    if node.member {
                        return true;
                    }
                }
                None => return false,
            }
        }
        false
    }
}

/// Split an absolute path into its components, validating it first.
///
/// Empty components collapse, so `/a//b/` and `/a/b` name the same member.
/// `/` itself yields an empty component list (the root).
fn components(path: &str) -> Result<Vec<&str>, PruneError> {
    if path.is_empty() {
        return Err(PruneError::malformed(path, "empty path"));
    }
    if !path.starts_with('/') {
        return Err(PruneError::malformed(path, "not absolute"));
    }
    if path.contains('\0') {
        return Err(PruneError::malformed(path, "contains NUL byte"));
    }
    Ok(path.split('/').filter(|c| !c.is_empty()).collect())
}
