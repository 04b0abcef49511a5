//! Duplicate key sublists.
//!
//! Only the first occurrence of a key takes part in the tree structure. Later
//! occurrences ("members") form a chain hanging from the key's leaf slot:
//!
//! ```text
//!   leaf slot ──> Yn (most recent)
//!   Yi.b[0] ──> Y(i-1), Y1.b[0] ──> X (first occurrence, in the tree)
//!   Yi.b[1] ──> Y(i+1), Yn.b[1] ──> Y1
//! ```
//!
//! Both branches of a member lead to elements with its own key, so the
//! descent sees a zero distance at `Yn` and stops there. Following
//! `Yn.b[1].b[0]` gets back to `X` in two steps.

use crate::descend::{Descent, Slot, Stop};
use crate::key::{KeyKind, KeyLayout};
use crate::node::{Link, Linked, NodeId};
use crate::tracing_helpers::trace_log;
use crate::tree::{CebMultiTree, CebTree, Mode};

/// Chain surgery for removing one occurrence of a duplicated key.
#[derive(Clone, Copy, Debug)]
pub(crate) enum ChainEdit {
    /// The only member goes: the leaf slot points to the first occurrence
    /// again.
    Only { slot: Slot, first: NodeId },
    /// The most recent member goes: its predecessor becomes the tail.
    Tail {
        slot: Slot,
        prev: NodeId,
        first_member: NodeId,
    },
    /// The oldest member goes while others remain.
    Head {
        tail: NodeId,
        next: NodeId,
        first: NodeId,
    },
    /// A member between two others goes.
    Interior { prev: NodeId, next: NodeId },
    /// The first occurrence goes: the oldest member takes over its place in
    /// the tree. `rest` holds the new oldest member and the tail when other
    /// members remain.
    Promote {
        first: NodeId,
        member: NodeId,
        owner: Option<Slot>,
        rest: Option<(NodeId, NodeId)>,
    },
}

impl<E, K, L, M> CebTree<E, K, L, M>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
    M: Mode,
{
    /// Whether `id` is a sublist member (not the first occurrence).
    pub(crate) fn is_dup_member(&self, slab: &[E], id: NodeId) -> bool {
        let [l, r] = Self::branches(slab, id);
        if l.is_null() {
            return false;
        }
        let me = Link::to(id);
        if l == me && r == me {
            return false;
        }
        K::is_zero(K::distance(
            self.key_of(slab, l.id()),
            self.key_of(slab, r.id()),
        ))
    }

    /// Member inserted right after `id`, if `id` is not the tail.
    #[inline]
    pub(crate) fn chain_next(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        let next = Self::branches(slab, id)[1].id();
        (Self::branches(slab, next)[0] == Link::to(id)).then_some(next)
    }

    /// Oldest member of the sublist whose tail is `tail`.
    #[inline]
    pub(crate) fn chain_first(&self, slab: &[E], tail: NodeId) -> NodeId {
        Self::branches(slab, tail)[1].id()
    }

    /// First occurrence of the key whose sublist tail is `tail`.
    #[inline]
    pub(crate) fn sublist_head(&self, slab: &[E], tail: NodeId) -> NodeId {
        let first_member = self.chain_first(slab, tail);
        Self::branches(slab, first_member)[0].id()
    }

    /// Appends `id` after `tail`, the element currently in the leaf `slot`.
    /// `sublist` tells whether `tail` is already a member.
    pub(crate) fn append_dup(
        &mut self,
        slab: &mut [E],
        slot: Slot,
        tail: NodeId,
        sublist: bool,
        id: NodeId,
    ) {
        let prev = Link::to(tail);
        if sublist {
            let first_member = Self::branches(slab, tail)[1];
            Self::set_branches(slab, id, [prev, first_member]);
            Self::set_branch(slab, tail, 1, Link::to(id));
        } else {
            Self::set_branches(slab, id, [prev, Link::to(id)]);
        }
        self.write_slot(slab, slot, Link::to(id));
    }

    /// Plans the removal of `target` (or of the first occurrence) from the
    /// sublist found by `d`. `None` if `target` is not part of it.
    pub(crate) fn plan_chain_removal(
        &self,
        slab: &[E],
        d: &Descent<K::Dist>,
        target: Option<NodeId>,
    ) -> Option<(NodeId, ChainEdit)> {
        let tail = d.node;
        let first_member = self.chain_first(slab, tail);
        let first = Self::branches(slab, first_member)[0].id();
        let victim = target.unwrap_or(first);

        if victim == first {
            let rest = (first_member != tail)
                .then(|| (Self::branches(slab, first_member)[1].id(), tail));
            let edit = ChainEdit::Promote {
                first,
                member: first_member,
                owner: d.owner,
                rest,
            };
            return Some((victim, edit));
        }

        let edit = match (victim == first_member, victim == tail) {
            (true, true) => ChainEdit::Only {
                slot: d.slot,
                first,
            },
            (false, true) => ChainEdit::Tail {
                slot: d.slot,
                prev: Self::branches(slab, tail)[0].id(),
                first_member,
            },
            (true, false) => ChainEdit::Head {
                tail,
                next: Self::branches(slab, first_member)[1].id(),
                first,
            },
            (false, false) => {
                // Stale or foreign node: it must be found between the first
                // member and the tail.
                let mut cur = first_member;
                while cur != victim {
                    cur = self.chain_next(slab, cur)?;
                }
                let [p, n] = Self::branches(slab, victim);
                ChainEdit::Interior {
                    prev: p.id(),
                    next: n.id(),
                }
            }
        };
        Some((victim, edit))
    }

    pub(crate) fn apply_chain_edit(&mut self, slab: &mut [E], edit: ChainEdit) {
        trace_log!(?edit, "sublist removal");

        match edit {
            ChainEdit::Only { slot, first } => self.write_slot(slab, slot, Link::to(first)),
            ChainEdit::Tail {
                slot,
                prev,
                first_member,
            } => {
                Self::set_branch(slab, prev, 1, Link::to(first_member));
                self.write_slot(slab, slot, Link::to(prev));
            }
            ChainEdit::Head { tail, next, first } => {
                Self::set_branch(slab, next, 0, Link::to(first));
                Self::set_branch(slab, tail, 1, Link::to(next));
            }
            ChainEdit::Interior { prev, next } => {
                Self::set_branch(slab, prev, 1, Link::to(next));
                Self::set_branch(slab, next, 0, Link::to(prev));
            }
            ChainEdit::Promote {
                first,
                member,
                owner,
                rest,
            } => {
                if let Some((next_member, tail)) = rest {
                    Self::set_branch(slab, next_member, 0, Link::to(member));
                    Self::set_branch(slab, tail, 1, Link::to(next_member));
                }

                // When `member` was the only one, the leaf slot already
                // points to it, and if that slot is one of `first`'s own
                // branches the copy below turns it into a self reference.
                let fb = Self::branches(slab, first);
                let me = Link::to(member);
                if fb == [Link::to(first); 2] {
                    Self::set_branches(slab, member, [me, me]);
                } else {
                    Self::set_branches(slab, member, fb);
                    debug_assert!(owner.is_some(), "forked first occurrence without owner slot");
                    if let Some(slot) = owner {
                        self.write_slot(slab, slot, me);
                    }
                }
            }
        }
    }
}

impl<E, K, L> CebMultiTree<E, K, L>
where
    E: Linked,
    K: KeyKind,
    L: KeyLayout<E, K>,
{
    /// Next occurrence of `id`'s key, in insertion order.
    pub fn next_dup(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        if !self.in_tree(slab, id) {
            return None;
        }
        if self.is_dup_member(slab, id) {
            return self.chain_next(slab, id);
        }

        let d = self.locate(slab, self.key_of(slab, id), false)?;
        (d.stop == Stop::Sublist && self.sublist_head(slab, d.node) == id)
            .then(|| self.chain_first(slab, d.node))
    }

    /// Previous occurrence of `id`'s key, in insertion order.
    pub fn prev_dup(&self, slab: &[E], id: NodeId) -> Option<NodeId> {
        if !self.in_tree(slab, id) || !self.is_dup_member(slab, id) {
            return None;
        }
        Self::branches(slab, id)[0].get()
    }
}
