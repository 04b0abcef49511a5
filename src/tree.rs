//! The tree root and its public operations.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use crate::descend::{Descent, Slot, Stop, Walk};
use crate::key::{Adjacent, KeyKind, KeyLayout, KeyType};
use crate::node::{Link, Linked, NodeId};
use crate::tracing_helpers::trace_log;

mod sealed {
    pub trait Sealed {}
}

/// Whether a tree accepts several elements with the same key.
pub trait Mode: sealed::Sealed {
    const DUPS: bool;
}

/// Keys are unique; inserting an existing key returns its owner.
#[derive(Clone, Copy, Debug)]
pub enum Unique {}

/// Equal keys are kept in insertion order.
#[derive(Clone, Copy, Debug)]
pub enum Multi {}

impl sealed::Sealed for Unique {}
impl sealed::Sealed for Multi {}

impl Mode for Unique {
    const DUPS: bool = false;
}

impl Mode for Multi {
    const DUPS: bool = true;
}

/// An ordered index over elements of type `E` kept in a caller-owned slab.
///
/// The tree itself is a single root slot. Elements embed a [`Node`]
/// (reachable through [`Linked`]) and are addressed by their [`NodeId`] in the
/// slab handed to each call; the tree never allocates, moves or drops them.
/// `K` selects the key kind, `L` where the key lives in `E`, and `M` whether
/// duplicates are allowed.
///
/// [`Node`]: crate::Node
pub struct CebTree<E, K, L = Adjacent, M = Unique> {
    pub(crate) root: Link,
    pub(crate) layout: L,
    _marker: PhantomData<(fn(&E), K, M)>,
}

/// A tree keeping every occurrence of duplicate keys.
pub type CebMultiTree<E, K, L = Adjacent> = CebTree<E, K, L, Multi>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rel {
    Le,
    Lt,
    Ge,
    Gt,
}

/// Where a new node goes.
#[derive(Clone, Copy, Debug)]
enum Splice {
    /// Empty tree: the node becomes the nodeless leaf.
    Empty,
    /// The node becomes a fork at `slot`, with itself on `side` and the
    /// previous occupant of the slot on the other side.
    Fork { slot: Slot, side: usize, other: NodeId },
    /// Same key already present in a duplicate tree.
    Dup { slot: Slot, tail: NodeId, sublist: bool },
}

impl<E, K, M> CebTree<E, K, Adjacent, M> {
    pub const fn new() -> Self {
        Self::with_layout(Adjacent)
    }
}

impl<E, K, M> Default for CebTree<E, K, Adjacent, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, K, L, M> CebTree<E, K, L, M> {
    pub const fn with_layout(layout: L) -> Self {
        Self {
            root: Link::NULL,
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }
}

impl<E, K, L, M> fmt::Debug for CebTree<E, K, L, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CebTree").field("root", &self.root).finish()
    }
}

impl<E, K, L, M> CebTree<E, K, L, M>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
    M: Mode,
{
    #[inline]
    pub fn key_type(&self) -> KeyType {
        K::TYPE
    }

    /// Whether `id` is currently linked into a tree.
    #[inline]
    pub fn in_tree(&self, slab: &[E], id: NodeId) -> bool {
        slab[id.index()].links().in_tree()
    }

    /// Inserts the detached element `id`.
    ///
    /// Returns the element that owns the key afterwards. In a unique tree
    /// that is the element already holding the key, if any, and `id` is left
    /// detached; the caller decides whether to give up or delete and retry.
    /// In a duplicate tree it is always `id`.
    pub fn insert(&mut self, slab: &mut [E], id: NodeId) -> NodeId {
        debug_assert!(!self.in_tree(slab, id), "inserting a linked node");

        let splice = {
            let slab: &[E] = slab;
            let key = self.key_of(slab, id);
            match self.descend(slab, Slot::Root, None, Walk::Key(key), false) {
                None => Splice::Empty,
                Some(d) => {
                    let ord = K::compare(key, self.key_of(slab, d.node));
                    match (d.stop, ord) {
                        (Stop::Diverged, _) => {
                            debug_assert_ne!(ord, Ordering::Equal);
                            Splice::Fork {
                                slot: d.slot,
                                side: usize::from(ord == Ordering::Greater),
                                other: d.node,
                            }
                        }
                        (_, Ordering::Equal) if !M::DUPS => return d.node,
                        (stop, Ordering::Equal) => Splice::Dup {
                            slot: d.slot,
                            tail: d.node,
                            sublist: stop == Stop::Sublist,
                        },
                        (_, ord) => Splice::Fork {
                            slot: d.slot,
                            side: usize::from(ord == Ordering::Greater),
                            other: d.node,
                        },
                    }
                }
            }
        };

        trace_log!(node = ?id, ?splice, "insert");

        let me = Link::to(id);
        match splice {
            Splice::Empty => {
                Self::set_branches(slab, id, [me, me]);
                self.root = me;
            }
            Splice::Fork { slot, side, other } => {
                let mut b = [Link::to(other); 2];
                b[side] = me;
                Self::set_branches(slab, id, b);
                self.write_slot(slab, slot, me);
            }
            Splice::Dup {
                slot,
                tail,
                sublist,
            } => self.append_dup(slab, slot, tail, sublist, id),
        }
        id
    }

    /// Smallest element; the first occurrence of its key.
    pub fn first(&self, slab: &[E]) -> Option<NodeId> {
        let d = self.descend(slab, Slot::Root, None, Walk::First, false)?;
        Some(self.entry(slab, &d))
    }

    /// Largest key; the first occurrence of it.
    pub fn last(&self, slab: &[E]) -> Option<NodeId> {
        let d = self.descend(slab, Slot::Root, None, Walk::Last, false)?;
        Some(self.entry(slab, &d))
    }

    /// Element holding `key`; the first inserted one in a duplicate tree.
    pub fn lookup(&self, slab: &[E], key: &K::Key) -> Option<NodeId> {
        let d = self.locate(slab, key, false)?;
        Some(self.entry(slab, &d))
    }

    /// Greatest element whose key is `<= key`.
    pub fn lookup_le(&self, slab: &[E], key: &K::Key) -> Option<NodeId> {
        self.lookup_rel(slab, key, Rel::Le)
    }

    /// Greatest element whose key is `< key`.
    pub fn lookup_lt(&self, slab: &[E], key: &K::Key) -> Option<NodeId> {
        self.lookup_rel(slab, key, Rel::Lt)
    }

    /// Smallest element whose key is `>= key`.
    pub fn lookup_ge(&self, slab: &[E], key: &K::Key) -> Option<NodeId> {
        self.lookup_rel(slab, key, Rel::Ge)
    }

    /// Smallest element whose key is `> key`.
    pub fn lookup_gt(&self, slab: &[E], key: &K::Key) -> Option<NodeId> {
        self.lookup_rel(slab, key, Rel::Gt)
    }

    /// Element following `id` in key order, visiting every duplicate.
    pub fn next(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        if M::DUPS && self.is_dup_member(slab, id) {
            if let Some(n) = self.chain_next(slab, id) {
                return Some(n);
            }
        }

        let key = self.key_of(slab, id);
        let d = self.locate(slab, key, false)?;
        if M::DUPS && d.stop == Stop::Sublist && !self.is_dup_member(slab, id) {
            return Some(self.chain_first(slab, d.node));
        }

        let n = self.resume(slab, d.next, Walk::First)?;
        Some(self.entry(slab, &n))
    }

    /// Element preceding `id` in key order, visiting every duplicate: from
    /// the first occurrence of a key this is the last occurrence of the
    /// previous key.
    pub fn prev(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        if M::DUPS && self.is_dup_member(slab, id) {
            return Self::branches(slab, id)[0].get();
        }

        let key = self.key_of(slab, id);
        let d = self.locate(slab, key, false)?;
        let p = self.resume(slab, d.prev, Walk::Last)?;
        Some(p.node)
    }

    /// First occurrence of the next greater key.
    pub fn next_unique(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        let key = self.key_of(slab, id);
        let d = self.locate(slab, key, false)?;
        let n = self.resume(slab, d.next, Walk::First)?;
        Some(self.entry(slab, &n))
    }

    /// First occurrence of the next smaller key.
    pub fn prev_unique(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        let key = self.key_of(slab, id);
        let d = self.locate(slab, key, false)?;
        let p = self.resume(slab, d.prev, Walk::Last)?;
        Some(self.entry(slab, &p))
    }

    /// Every element in key order, duplicates in insertion order.
    pub fn iter<'a>(&'a self, slab: &'a [E]) -> Iter<'a, E, K, L, M> {
        let front = self.first(slab);
        let back = self
            .descend(slab, Slot::Root, None, Walk::Last, false)
            .map(|d| d.node);
        Iter {
            tree: self,
            slab,
            front,
            back,
        }
    }

    fn lookup_rel(&self, slab: &[E], key: &K::Key, rel: Rel) -> Option<NodeId> {
        let d = self.descend(slab, Slot::Root, None, Walk::Key(key), false)?;
        let forward = matches!(rel, Rel::Ge | Rel::Gt);
        let ord = K::compare(self.key_of(slab, d.node), key);

        let found = if d.stop.at_leaf() {
            let hit = match rel {
                Rel::Le => ord != Ordering::Greater,
                Rel::Lt => ord == Ordering::Less,
                Rel::Ge => ord != Ordering::Less,
                Rel::Gt => ord == Ordering::Greater,
            };
            if hit {
                Some(d)
            } else if forward {
                self.resume(slab, d.next, Walk::First)
            } else {
                self.resume(slab, d.prev, Walk::Last)
            }
        } else {
            // Every key below the diverging fork sorts on the same side of
            // `key`, so `d.node`'s own key tells which side that is.
            match (forward, ord) {
                (true, Ordering::Greater) => {
                    self.descend(slab, d.slot, d.dist, Walk::First, false)
                }
                (false, Ordering::Less) => self.descend(slab, d.slot, d.dist, Walk::Last, false),
                (true, _) => self.resume(slab, d.next, Walk::First),
                (false, _) => self.resume(slab, d.prev, Walk::Last),
            }
        }?;

        Some(self.entry(slab, &found))
    }

    /// Element reported for a descent that stopped on a leaf: the first
    /// occurrence when the leaf is a sublist.
    #[inline]
    fn entry(&self, slab: &[E], d: &Descent<K::Dist>) -> NodeId {
        if M::DUPS && d.stop == Stop::Sublist {
            self.sublist_head(slab, d.node)
        } else {
            d.node
        }
    }
}

/// In-order iterator over the elements of a tree.
pub struct Iter<'a, E, K, L, M> {
    tree: &'a CebTree<E, K, L, M>,
    slab: &'a [E],
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl<'a, E, K, L, M> Iterator for Iter<'a, E, K, L, M>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
    M: Mode,
{
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.front?;
        if Some(cur) == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.tree.next(self.slab, cur);
        }
        Some(cur)
    }
}

impl<'a, E, K, L, M> DoubleEndedIterator for Iter<'a, E, K, L, M>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
    M: Mode,
{
    fn next_back(&mut self) -> Option<NodeId> {
        let cur = self.back?;
        if Some(cur) == self.front {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.tree.prev(self.slab, cur);
        }
        Some(cur)
    }
}
