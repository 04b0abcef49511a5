//! Deletion.
//!
//! Removing an element takes out two things: its leaf, and (unless it is the
//! nodeless leaf) the fork it owns somewhere above that leaf. The fork that
//! held the leaf loses a branch and disappears too, so its node is free to
//! take over the removed element's fork. Which links change depends only on
//! the shape around the leaf, see [`Unlink`].

use crate::descend::{Descent, Slot, Stop};
use crate::dup::ChainEdit;
use crate::key::{KeyKind, KeyLayout};
use crate::node::{Link, Linked, NodeId};
use crate::tracing_helpers::{debug_log, trace_log};
use crate::tree::{CebTree, Mode};

/// How a leaf leaves the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unlink {
    /// The only element: the root is cleared.
    Emptied,
    /// The leaf hangs from its own fork: the grand parent slot takes the
    /// other branch and nothing else changes.
    SelfFork { up: Slot, sibling: Link },
    /// The nodeless leaf of a larger tree: its leaf parent gives up its fork
    /// and becomes the new nodeless leaf.
    PromoteNodeless {
        up: Slot,
        sibling: Link,
        parent: NodeId,
    },
    /// General case: the leaf parent gives up its fork and takes over the
    /// fork of the removed element, which `owner` points to.
    PromoteParent {
        up: Slot,
        sibling: Link,
        parent: NodeId,
        owner: Slot,
    },
}

#[derive(Clone, Copy, Debug)]
enum Removal {
    Leaf(NodeId, Unlink),
    Chain(NodeId, ChainEdit),
}

impl<E, K, L, M> CebTree<E, K, L, M>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
    M: Mode,
{
    /// Detaches `id` from the tree.
    ///
    /// Returns `None`, and changes nothing, if `id` is not linked or does not
    /// own its key in this tree. On success `id`'s links are cleared and the
    /// caller may release it.
    pub fn delete(&mut self, slab: &mut [E], id: NodeId) -> Option<NodeId> {
        if !self.in_tree(slab, id) {
            return None;
        }

        let removal = {
            let slab: &[E] = slab;
            let key = self.key_of(slab, id);
            self.plan_removal(slab, key, Some(id))?
        };
        Some(self.apply_removal(slab, removal))
    }

    /// Looks `key` up and detaches the element found, the first occurrence
    /// in a duplicate tree.
    pub fn pick(&mut self, slab: &mut [E], key: &K::Key) -> Option<NodeId> {
        let removal = self.plan_removal(slab, key, None)?;
        let victim = match removal {
            Removal::Leaf(victim, _) | Removal::Chain(victim, _) => victim,
        };
        debug_assert!(
            K::matches(key, self.key_of(slab, victim)),
            "picked an element with another key"
        );
        Some(self.apply_removal(slab, removal))
    }

    fn plan_removal(
        &self,
        slab: &[E],
        key: &K::Key,
        target: Option<NodeId>,
    ) -> Option<Removal> {
        let d = self.locate(slab, key, true)?;

        if M::DUPS && d.stop == Stop::Sublist {
            let (victim, edit) = self.plan_chain_removal(slab, &d, target)?;
            return Some(Removal::Chain(victim, edit));
        }

        if target.is_some_and(|t| t != d.node) {
            return None;
        }
        Some(Removal::Leaf(d.node, self.plan_unlink(slab, &d)))
    }

    fn plan_unlink(&self, slab: &[E], d: &Descent<K::Dist>) -> Unlink {
        let Slot::Branch(parent, side) = d.slot else {
            debug_assert_eq!(d.stop, Stop::Nodeless);
            return Unlink::Emptied;
        };

        // The leaf parent is a fork, so it was reached through some slot.
        let up = d.parent_slot.unwrap_or(Slot::Root);
        let sibling = Self::branches(slab, parent)[side ^ 1];

        if parent == d.node {
            Unlink::SelfFork { up, sibling }
        } else if d.stop == Stop::Nodeless {
            Unlink::PromoteNodeless {
                up,
                sibling,
                parent,
            }
        } else {
            debug_assert!(d.owner.is_some(), "leaf without a fork on its path");
            Unlink::PromoteParent {
                up,
                sibling,
                parent,
                owner: d.owner.unwrap_or(Slot::Root),
            }
        }
    }

    fn apply_removal(&mut self, slab: &mut [E], removal: Removal) -> NodeId {
        let victim = match removal {
            Removal::Leaf(victim, how) => {
                trace_log!(node = ?victim, ?how, "unlink");
                self.apply_unlink(slab, victim, how);
                victim
            }
            Removal::Chain(victim, edit) => {
                self.apply_chain_edit(slab, edit);
                victim
            }
        };

        slab[victim.index()].links_mut().detach();
        debug_log!(node = ?victim, "deleted");
        victim
    }

    fn apply_unlink(&mut self, slab: &mut [E], victim: NodeId, how: Unlink) {
        match how {
            Unlink::Emptied => self.root = Link::NULL,
            Unlink::SelfFork { up, sibling } => self.write_slot(slab, up, sibling),
            Unlink::PromoteNodeless {
                up,
                sibling,
                parent,
            } => {
                self.write_slot(slab, up, sibling);
                let me = Link::to(parent);
                Self::set_branches(slab, parent, [me, me]);
            }
            Unlink::PromoteParent {
                up,
                sibling,
                parent,
                owner,
            } => {
                // `up` may be one of the victim's own branches, so it must be
                // rewritten before those are handed over.
                self.write_slot(slab, up, sibling);
                let b = Self::branches(slab, victim);
                Self::set_branches(slab, parent, b);
                self.write_slot(slab, owner, Link::to(parent));
            }
        }
    }
}
