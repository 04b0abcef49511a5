//! The descent engine.
//!
//! Every operation starts by walking from a slot (usually the root) down to
//! the position its intent designates. The walk never needs a stored bit
//! position: at each node it recomputes the distance between the keys its two
//! branches lead to. Along a path of forks this distance strictly decreases,
//! so reaching a node whose distance did not decrease means we followed a
//! leaf reference to a node whose fork lies higher up (or to the fork we just
//! left, through its own branch). The nodeless leaf is recognised by both of
//! its branches pointing to itself, and in duplicate trees a zero distance
//! marks the tail of a sublist.

use crate::key::{KeyKind, KeyLayout};
use crate::node::{Link, Linked, NodeId};
use crate::tree::{CebTree, Mode};

/// A branch slot. The root slot acts as a virtual parent so that splicing at
/// the top of the tree and under a fork are the same operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Root,
    Branch(NodeId, usize),
}

/// A subtree to resume a key-less walk from, with the distance of the fork
/// that owns it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Restart<D> {
    pub(crate) slot: Slot,
    pub(crate) dist: D,
}

/// Why a descent stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stop {
    /// Both branches point to the node itself.
    Nodeless,
    /// Zero distance between the branches: tail of a duplicate sublist.
    Sublist,
    /// Leaf reference to a node whose fork is this one or higher.
    Leaf,
    /// The searched key differs from everything below this fork.
    Diverged,
}

impl Stop {
    #[inline]
    pub(crate) fn at_leaf(self) -> bool {
        self != Stop::Diverged
    }
}

pub(crate) enum Walk<'k, Q: ?Sized> {
    /// Always left.
    First,
    /// Always right.
    Last,
    /// Towards the branch closest to the key.
    Key(&'k Q),
}

/// Everything a descent learned on its way down.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Descent<D> {
    /// Node the walk stopped on: a leaf, or the fork above which the key
    /// diverged.
    pub(crate) node: NodeId,
    pub(crate) stop: Stop,
    /// Slot `node` was reached through (leaf parent and side).
    pub(crate) slot: Slot,
    /// Slot the leaf parent was reached through (grand parent and side).
    /// `None` when `slot` is the starting slot.
    pub(crate) parent_slot: Option<Slot>,
    /// Distance of the fork owning `slot`, `None` at the root.
    pub(crate) dist: Option<D>,
    /// Slot through which the fork of the node owning the searched key was
    /// reached. Only tracked on request.
    pub(crate) owner: Option<Slot>,
    /// Right branch of the deepest left turn.
    pub(crate) next: Option<Restart<D>>,
    /// Left branch of the deepest right turn.
    pub(crate) prev: Option<Restart<D>>,
}

impl<E, K, L, M> CebTree<E, K, L, M>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
    M: Mode,
{
    #[inline]
    pub(crate) fn key_of<'s>(&self, slab: &'s [E], id: NodeId) -> &'s K::Key {
        self.layout.key(&slab[id.index()])
    }

    #[inline]
    pub(crate) fn branches(slab: &[E], id: NodeId) -> [Link; 2] {
        slab[id.index()].links().b
    }

    #[inline]
    pub(crate) fn set_branches(slab: &mut [E], id: NodeId, b: [Link; 2]) {
        slab[id.index()].links_mut().b = b;
    }

    #[inline]
    pub(crate) fn set_branch(slab: &mut [E], id: NodeId, side: usize, link: Link) {
        slab[id.index()].links_mut().b[side] = link;
    }

    #[inline]
    pub(crate) fn read_slot(&self, slab: &[E], slot: Slot) -> Link {
        match slot {
            Slot::Root => self.root,
            Slot::Branch(id, side) => Self::branches(slab, id)[side],
        }
    }

    #[inline]
    pub(crate) fn write_slot(&mut self, slab: &mut [E], slot: Slot, link: Link) {
        match slot {
            Slot::Root => self.root = link,
            Slot::Branch(id, side) => Self::set_branch(slab, id, side, link),
        }
    }

    /// Walks from `start` until `walk` reaches its position.
    ///
    /// `dist` is the distance of the fork owning `start` (`None` for the
    /// root). Returns `None` only when `start` is empty.
    pub(crate) fn descend(
        &self,
        slab: &[E],
        start: Slot,
        dist: Option<K::Dist>,
        walk: Walk<'_, K::Key>,
        track_owner: bool,
    ) -> Option<Descent<K::Dist>> {
        let mut slot = start;
        let mut parent_slot = None;
        let mut pdist = dist;
        let mut owner = None;
        let mut next = None;
        let mut prev = None;
        // Leading bits the searched key shares with every key below `slot`.
        let mut skip = 0;

        let mut node = self.read_slot(slab, slot).get()?;

        macro_rules! stop {
            ($why:expr) => {
                return Some(Descent {
                    node,
                    stop: $why,
                    slot,
                    parent_slot,
                    dist: pdist,
                    owner,
                    next,
                    prev,
                })
            };
        }

        loop {
            let [l, r] = Self::branches(slab, node);
            debug_assert!(!l.is_null() && !r.is_null(), "detached node in tree");

            let me = Link::to(node);
            if l == me && r == me {
                stop!(Stop::Nodeless);
            }

            let lkey = self.key_of(slab, l.id());
            let rkey = self.key_of(slab, r.id());
            let d = K::distance(lkey, rkey);

            if M::DUPS && K::is_zero(d) {
                stop!(Stop::Sublist);
            }
            debug_assert!(!K::is_zero(d), "equal keys below a fork of a unique tree");

            if matches!(pdist, Some(p) if d >= p) {
                stop!(Stop::Leaf);
            }

            let side = match walk {
                Walk::First => 0,
                Walk::Last => 1,
                Walk::Key(key) => {
                    if track_owner && K::matches(key, self.key_of(slab, node)) {
                        owner = Some(slot);
                    }

                    // Both branches are below `slot` here: a leaf reference
                    // could lead outside of it but was handled above.
                    let dl = K::distance_from(key, lkey, skip);
                    let dr = K::distance_from(key, rkey, skip);

                    // Farther from both branches than they are from each
                    // other: the key differs above this fork's split bit.
                    if dl > d && dr > d {
                        stop!(Stop::Diverged);
                    }
                    // The key is no farther than `d` from the side it takes,
                    // so it shares the fork's prefix with all of that side.
                    skip = K::common_bits(lkey, d);
                    usize::from(dl > dr)
                }
            };

            if side == 0 {
                next = Some(Restart {
                    slot: Slot::Branch(node, 1),
                    dist: d,
                });
            } else {
                prev = Some(Restart {
                    slot: Slot::Branch(node, 0),
                    dist: d,
                });
            }

            parent_slot = Some(slot);
            slot = Slot::Branch(node, side);
            pdist = Some(d);
            node = Self::branches(slab, node)[side].id();
        }
    }

    /// Resumes a key-less walk from a restart fork.
    #[inline]
    pub(crate) fn resume(
        &self,
        slab: &[E],
        restart: Option<Restart<K::Dist>>,
        walk: Walk<'_, K::Key>,
    ) -> Option<Descent<K::Dist>> {
        let r = restart?;
        self.descend(slab, r.slot, Some(r.dist), walk, false)
    }

    /// Keyed descent that only succeeds on a leaf holding exactly `key`.
    pub(crate) fn locate(
        &self,
        slab: &[E],
        key: &K::Key,
        track_owner: bool,
    ) -> Option<Descent<K::Dist>> {
        let d = self.descend(slab, Slot::Root, None, Walk::Key(key), track_owner)?;
        (d.stop.at_leaf() && K::matches(key, self.key_of(slab, d.node))).then_some(d)
    }
}
