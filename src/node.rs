//! Tree links embedded in caller records.

use std::fmt;

/// Index of an element in the caller's slab.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// # Panics
    ///
    /// Panics if `index` does not fit the link encoding (`u32::MAX` is
    /// reserved for the null marker).
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(index < Link::NULL.0 as usize, "slab index out of range");
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Branch link: a slab index, or `NULL` for "no node".
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link(u32);

impl Link {
    pub(crate) const NULL: Link = Link(u32::MAX);

    #[inline]
    pub(crate) fn to(id: NodeId) -> Self {
        Self(id.0)
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    pub(crate) fn get(self) -> Option<NodeId> {
        (!self.is_null()).then_some(NodeId(self.0))
    }

    /// Target of a link known to be set.
    #[inline]
    pub(crate) fn id(self) -> NodeId {
        debug_assert!(!self.is_null(), "following a null link");
        NodeId(self.0)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(id) => id.fmt(f),
            None => f.write_str("NULL"),
        }
    }
}

/// The two branch slots an element carries to be part of a tree.
///
/// A fresh node is detached. Once inserted, `b[0]` and `b[1]` reference other
/// elements of the same slab (or the element itself); on removal both are
/// reset to null.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub(crate) b: [Link; 2],
}

impl Node {
    pub const fn new() -> Self {
        Self {
            b: [Link::NULL, Link::NULL],
        }
    }

    /// Whether the node is currently linked into a tree.
    #[inline]
    pub fn in_tree(&self) -> bool {
        !self.b[0].is_null()
    }

    #[inline]
    pub(crate) fn detach(&mut self) {
        self.b = [Link::NULL, Link::NULL];
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.b.iter()).finish()
    }
}

/// A record embedding a [`Node`].
pub trait Linked {
    fn links(&self) -> &Node;
    fn links_mut(&mut self) -> &mut Node;
}

impl Linked for Node {
    #[inline]
    fn links(&self) -> &Node {
        self
    }

    #[inline]
    fn links_mut(&mut self) -> &mut Node {
        self
    }
}
