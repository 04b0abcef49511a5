//! # ceb-rs
//!
//! An intrusive ordered index using compact elastic binary trees: binary
//! crit-bit tries where every element carries just two links and no bit
//! position. The split position of a fork is recomputed from the keys below
//! it while descending, so there is no rebalancing and no per-node metadata
//! besides the links.
//!
//! Elements live in a slab owned by the caller (a `Vec` or any slice). Each
//! one embeds a [`Node`] and is addressed by its [`NodeId`]; the tree only
//! owns its root and never allocates.
//!
//! ## Example
//!
//! ```rust
//! use ceb_rs::{CebTree, Keyed, Linked, Node, NodeId, U32};
//!
//! struct Timer {
//!     node: Node,
//!     expire: u32,
//! }
//!
//! impl Linked for Timer {
//!     fn links(&self) -> &Node { &self.node }
//!     fn links_mut(&mut self) -> &mut Node { &mut self.node }
//! }
//!
//! impl Keyed<U32> for Timer {
//!     fn key(&self) -> &u32 { &self.expire }
//! }
//!
//! let mut slab: Vec<Timer> = [30, 10, 20]
//!     .into_iter()
//!     .map(|expire| Timer { node: Node::new(), expire })
//!     .collect();
//!
//! let mut tree: CebTree<Timer, U32> = CebTree::new();
//! for i in 0..slab.len() {
//!     tree.insert(&mut slab, NodeId::new(i));
//! }
//!
//! let order: Vec<u32> = tree.iter(&slab).map(|id| slab[id.index()].expire).collect();
//! assert_eq!(order, [10, 20, 30]);
//! assert_eq!(tree.lookup_ge(&slab, &15), Some(NodeId::new(2)));
//! ```
//!
//! ## Key kinds
//!
//! | Kind | Key | Distance |
//! |------|-----|----------|
//! | [`U32`], [`U64`], [`Addr`] | integer | xor |
//! | [`Block<N>`], [`BlockRef`] | fixed-length bytes | bits after the common prefix |
//! | [`Str`], [`StrRef`] | NUL-terminated string | bits after the common prefix |
//!
//! The key is found through a [`KeyLayout`]: [`Adjacent`] asks the element
//! ([`Keyed`]), [`Field`] applies a caller-supplied projection.
//!
//! ## Duplicates
//!
//! [`CebMultiTree`] keeps every occurrence of a key in insertion order.
//! Lookups return the first one; [`CebMultiTree::next_dup`] and
//! [`CebMultiTree::prev_dup`] walk the others.

#![forbid(unsafe_code)]

pub mod bits;
mod descend;
mod dup;
pub mod key;
mod node;
mod remove;
mod tracing_helpers;
mod tree;

pub use key::{
    Addr, Adjacent, Block, BlockRef, Field, KeyKind, KeyLayout, KeyType, Keyed, Str, StrRef, U32,
    U64,
};
pub use node::{Linked, Node, NodeId};
pub use tree::{CebMultiTree, CebTree, Iter, Mode, Multi, Unique};
