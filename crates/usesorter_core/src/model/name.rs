//! Bounded-length atom name.
//!
//! # Responsibility
//! - Own the fixed-capacity name buffer of an atom.
//! - Apply the truncate-on-write policy for over-length input.
//!
//! # Invariants
//! - The buffer holds `NAME_CAPACITY + 1` bytes and never grows.
//! - The stored text is at most `NAME_CAPACITY` bytes and is always followed by
//!   at least one zero byte.
//! - The stored text is a valid UTF-8 prefix of the last written input.

use crate::alloc::{AllocResult, Allocator};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};

/// Maximum number of name bytes kept; longer input is truncated.
pub const NAME_CAPACITY: usize = 64;
const NAME_BUFFER_LEN: usize = NAME_CAPACITY + 1;

/// Fixed-capacity owned name text.
///
/// There is no `Clone`; copies go through an allocator with
/// [`AtomName::try_clone_in`] so the failure policy applies to them too.
pub struct AtomName {
    buf: Box<[u8]>,
    len: usize,
}

impl AtomName {
    /// Allocates an empty, zero-filled name buffer.
    pub fn new_in(allocator: &Allocator) -> AllocResult<Self> {
        let buf = allocator
            .allocate_zeroed::<u8>(NAME_BUFFER_LEN)?
            .into_boxed_slice();
        Ok(Self { buf, len: 0 })
    }

    /// Allocates a buffer and writes `value` into it, truncating silently.
    pub fn from_str_in(value: &str, allocator: &Allocator) -> AllocResult<Self> {
        let mut name = Self::new_in(allocator)?;
        name.write(value);
        Ok(name)
    }

    /// Overwrites the stored text and returns the number of bytes kept.
    ///
    /// Bytes beyond `NAME_CAPACITY` are dropped, backing off to the previous
    /// char boundary. The unused tail of the buffer is zeroed.
    pub fn write(&mut self, value: &str) -> usize {
        let kept = truncate_to_capacity(value, NAME_CAPACITY).as_bytes();
        self.buf[..kept.len()].copy_from_slice(kept);
        self.buf[kept.len()..].fill(0);
        self.len = kept.len();
        self.len
    }

    pub fn as_str(&self) -> &str {
        // Only ever filled from a `&str` prefix cut on a char boundary.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of text bytes this name can hold.
    pub fn capacity(&self) -> usize {
        self.buf.len() - 1
    }

    /// Allocates an independent snapshot of this name.
    pub fn try_clone_in(&self, allocator: &Allocator) -> AllocResult<Self> {
        let mut copy = Self::new_in(allocator)?;
        copy.buf[..self.len].copy_from_slice(&self.buf[..self.len]);
        copy.len = self.len;
        Ok(copy)
    }
}

/// Returns the longest prefix of `value` that fits in `capacity` bytes without
/// splitting a character.
pub fn truncate_to_capacity(value: &str, capacity: usize) -> &str {
    if value.len() <= capacity {
        return value;
    }
    let mut cut = capacity;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    &value[..cut]
}

impl Debug for AtomName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AtomName").field(&self.as_str()).finish()
    }
}

impl Display for AtomName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for AtomName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for AtomName {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for AtomName {}

impl PartialEq<str> for AtomName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for AtomName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for AtomName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AtomName {
    /// Over-length input is truncated, matching `write`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_str_in(&value, &Allocator::system()).map_err(D::Error::custom)
    }
}
