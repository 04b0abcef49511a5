//! Key kinds and key layouts.
//!
//! A key kind tells the engine how far apart two keys are (`distance`) and
//! how they sort (`compare`). The engine only relies on two properties of the
//! distance:
//!
//! - it is zero iff both keys are identical;
//! - it grows as the first differing bit moves towards the most significant
//!   end, so comparing two distances compares the positions of the split bits.
//!
//! Scalars use the xor of both values. Blocks and strings use the complement
//! of their common prefix length in bits.
//!
//! A key layout tells the engine where the key of an element lives: either
//! the element knows it ([`Adjacent`] over [`Keyed`]), or a caller-supplied
//! projection finds it anywhere in the record ([`Field`]).

use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;

use crate::bits::{equal_bits, string_equal_bits, until_nul};

mod sealed {
    pub trait Sealed {}
}

/// The closed set of supported key kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    U32,
    U64,
    Addr,
    Block,
    BlockRef,
    Str,
    StrRef,
}

/// Distance and ordering over one kind of key.
pub trait KeyKind: sealed::Sealed {
    /// Key as seen through an element.
    type Key: ?Sized;
    /// Inter-key distance. `Default::default()` is the zero distance.
    type Dist: Copy + Ord + Default + fmt::Debug;

    const TYPE: KeyType;

    fn distance(a: &Self::Key, b: &Self::Key) -> Self::Dist;

    /// Same as [`distance`](Self::distance) for keys whose first `skip` bits
    /// are already known to be equal. Kinds that scan bytes start there.
    #[inline]
    fn distance_from(a: &Self::Key, b: &Self::Key, _skip: usize) -> Self::Dist {
        Self::distance(a, b)
    }

    /// Leading bits shared by `key` and any key `d` away from it. Only a
    /// lower bound is required; `0` is always correct.
    #[inline]
    fn common_bits(_key: &Self::Key, _d: Self::Dist) -> usize {
        0
    }

    fn compare(a: &Self::Key, b: &Self::Key) -> Ordering;

    #[inline]
    fn matches(a: &Self::Key, b: &Self::Key) -> bool {
        Self::compare(a, b) == Ordering::Equal
    }

    #[inline]
    fn is_zero(d: Self::Dist) -> bool {
        d == Self::Dist::default()
    }
}

// =============================================================================
// Scalar kinds
// =============================================================================

/// 32-bit unsigned integer keys.
#[derive(Clone, Copy, Debug)]
pub enum U32 {}

/// 64-bit unsigned integer keys.
#[derive(Clone, Copy, Debug)]
pub enum U64 {}

/// Raw address keys (`ptr as usize`).
#[derive(Clone, Copy, Debug)]
pub enum Addr {}

macro_rules! scalar_kind {
    ($kind:ty, $key:ty, $tag:expr) => {
        impl sealed::Sealed for $kind {}

        impl KeyKind for $kind {
            type Key = $key;
            type Dist = $key;

            const TYPE: KeyType = $tag;

            #[inline]
            fn distance(a: &$key, b: &$key) -> $key {
                a ^ b
            }

            #[inline]
            fn compare(a: &$key, b: &$key) -> Ordering {
                a.cmp(b)
            }
        }
    };
}

scalar_kind!(U32, u32, KeyType::U32);
scalar_kind!(U64, u64, KeyType::U64);
scalar_kind!(Addr, usize, KeyType::Addr);

// =============================================================================
// Block kinds
// =============================================================================

/// Fixed-length byte blocks of `N` bytes stored in the element.
#[derive(Clone, Copy, Debug)]
pub enum Block<const N: usize> {}

impl<const N: usize> sealed::Sealed for Block<N> {}

impl<const N: usize> KeyKind for Block<N> {
    type Key = [u8; N];
    type Dist = usize;

    const TYPE: KeyType = KeyType::Block;

    #[inline]
    fn distance(a: &[u8; N], b: &[u8; N]) -> usize {
        Self::distance_from(a, b, 0)
    }

    #[inline]
    fn distance_from(a: &[u8; N], b: &[u8; N], skip: usize) -> usize {
        N * 8 - equal_bits(a, b, skip, N * 8)
    }

    #[inline]
    fn common_bits(_key: &[u8; N], d: usize) -> usize {
        N * 8 - d
    }

    #[inline]
    fn compare(a: &[u8; N], b: &[u8; N]) -> Ordering {
        a.cmp(b)
    }
}

/// Byte blocks referenced by the element. The length travels with the
/// slice; all keys of one tree must share it.
#[derive(Clone, Copy, Debug)]
pub enum BlockRef {}

impl sealed::Sealed for BlockRef {}

impl KeyKind for BlockRef {
    type Key = [u8];
    type Dist = usize;

    const TYPE: KeyType = KeyType::BlockRef;

    #[inline]
    fn distance(a: &[u8], b: &[u8]) -> usize {
        Self::distance_from(a, b, 0)
    }

    #[inline]
    fn distance_from(a: &[u8], b: &[u8], skip: usize) -> usize {
        debug_assert_eq!(a.len(), b.len(), "block keys must share one length");
        let bits = a.len().min(b.len()) * 8;
        bits - equal_bits(a, b, skip.min(bits), bits)
    }

    #[inline]
    fn common_bits(key: &[u8], d: usize) -> usize {
        (key.len() * 8).saturating_sub(d)
    }

    #[inline]
    fn compare(a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

// =============================================================================
// String kinds
// =============================================================================

#[inline]
fn string_distance(a: &[u8], b: &[u8], skip: usize) -> usize {
    match string_equal_bits(a, b, skip) {
        Some(bits) => usize::MAX - bits,
        None => 0,
    }
}

#[inline]
fn string_common_bits(d: usize) -> usize {
    // Equal strings share everything up to their terminator, which the
    // distance does not record.
    if d == 0 {
        0
    } else {
        usize::MAX - d
    }
}

/// NUL-terminated strings stored in the element, e.g. a `[u8; 32]` buffer.
/// The string ends at the first NUL or at the end of the buffer.
#[derive(Clone, Copy, Debug)]
pub enum Str {}

impl sealed::Sealed for Str {}

impl KeyKind for Str {
    type Key = [u8];
    type Dist = usize;

    const TYPE: KeyType = KeyType::Str;

    #[inline]
    fn distance(a: &[u8], b: &[u8]) -> usize {
        string_distance(a, b, 0)
    }

    #[inline]
    fn distance_from(a: &[u8], b: &[u8], skip: usize) -> usize {
        string_distance(a, b, skip)
    }

    #[inline]
    fn common_bits(_key: &[u8], d: usize) -> usize {
        string_common_bits(d)
    }

    #[inline]
    fn compare(a: &[u8], b: &[u8]) -> Ordering {
        until_nul(a).cmp(until_nul(b))
    }
}

/// NUL-terminated strings referenced by the element (`CString`,
/// `Box<CStr>`, `&'static CStr`, ...).
#[derive(Clone, Copy, Debug)]
pub enum StrRef {}

impl sealed::Sealed for StrRef {}

impl KeyKind for StrRef {
    type Key = CStr;
    type Dist = usize;

    const TYPE: KeyType = KeyType::StrRef;

    #[inline]
    fn distance(a: &CStr, b: &CStr) -> usize {
        string_distance(a.to_bytes(), b.to_bytes(), 0)
    }

    #[inline]
    fn distance_from(a: &CStr, b: &CStr, skip: usize) -> usize {
        string_distance(a.to_bytes(), b.to_bytes(), skip)
    }

    #[inline]
    fn common_bits(_key: &CStr, d: usize) -> usize {
        string_common_bits(d)
    }

    #[inline]
    fn compare(a: &CStr, b: &CStr) -> Ordering {
        a.to_bytes().cmp(b.to_bytes())
    }
}

// =============================================================================
// Key layouts
// =============================================================================

/// An element that knows its own key of kind `K`.
pub trait Keyed<K: KeyKind> {
    fn key(&self) -> &K::Key;
}

/// Locates the key of kind `K` inside an element of type `E`.
pub trait KeyLayout<E, K: KeyKind> {
    fn key<'a>(&self, elem: &'a E) -> &'a K::Key;
}

/// Fixed layout: the key sits next to the node and the element exposes it
/// through [`Keyed`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Adjacent;

impl<E: Keyed<K>, K: KeyKind> KeyLayout<E, K> for Adjacent {
    #[inline]
    fn key<'a>(&self, elem: &'a E) -> &'a K::Key {
        elem.key()
    }
}

/// Generic layout: the key is found by a caller-supplied projection, so the
/// node and the key may be separated by any other fields of the record.
pub struct Field<E, Q: ?Sized> {
    project: fn(&E) -> &Q,
    _marker: PhantomData<fn(&E) -> &Q>,
}

impl<E, Q: ?Sized> Field<E, Q> {
    pub const fn new(project: fn(&E) -> &Q) -> Self {
        Self {
            project,
            _marker: PhantomData,
        }
    }
}

impl<E, Q: ?Sized> Clone for Field<E, Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, Q: ?Sized> Copy for Field<E, Q> {}

impl<E, Q: ?Sized> fmt::Debug for Field<E, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").finish_non_exhaustive()
    }
}

impl<E, K: KeyKind> KeyLayout<E, K> for Field<E, K::Key> {
    #[inline]
    fn key<'a>(&self, elem: &'a E) -> &'a K::Key {
        (self.project)(elem)
    }
}
