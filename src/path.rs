//------------ Path (path tuple) --------------------------------------------

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An ordered sequence of path segments addressing a node from the root,
/// e.g. `("", "a", "b")`. The first segment is conventionally the empty
/// root marker. The empty tuple is never a valid path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Arc<[Box<str>]>);

impl Path {
    /// Build a path from an iterator of owned segments. Panics are not
    /// used here on purpose: callers that need to reject the empty tuple
    /// should check [`Path::is_empty`] and raise `ObjectMapError::BadArgument`.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[Box<str>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(|s| s.as_ref())
    }

    /// The non-empty prefix of length `n` (1-indexed from the root), i.e.
    /// `self.prefix(k+1)` is the ancestor path at depth `k` from the root.
    pub fn prefix(&self, n: usize) -> Path {
        debug_assert!(n <= self.0.len());
        Path(self.0[..n].iter().cloned().collect())
    }

    /// `true` if `self` is `other` or a descendant of `other`, i.e. `other`
    /// is a segment-wise prefix of `self`.
    pub fn has_prefix(&self, other: &Path) -> bool {
        other.0.len() <= self.0.len() && self.0[..other.0.len()] == *other.0
    }

    pub fn child(&self, name: impl Into<Box<str>>) -> Path {
        let mut segs: Vec<Box<str>> = self.0.iter().cloned().collect();
        segs.push(name.into());
        Path(segs.into())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{seg:?}")?;
        }
        write!(f, ")")
    }
}

impl<S: Into<Box<str>>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path::from_segments(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_ordering_is_lexicographic_segment_wise() {
        let a = Path::from_segments(["", "a"]);
        let ab = Path::from_segments(["", "a", "b"]);
        let z = Path::from_segments(["", "z"]);
        assert!(a < ab);
        assert!(ab < z);
    }

    #[test]
    fn has_prefix() {
        let root = Path::from_segments([""]);
        let abc = Path::from_segments(["", "a", "b", "c"]);
        assert!(abc.has_prefix(&root));
        assert!(abc.has_prefix(&abc));
        assert!(!root.has_prefix(&abc));
    }
}
