//! Page Module
//!
//! A page is a fixed 1024-byte block holding key/value pairs.
//!
//! ## Layout
//! ```text
//! ┌─────────┬───────────────────────┬────────┬──────────────────────────┐
//! │ N (u16) │ k1 v1 k2 v2 ... (u16) │  free  │ ... val2 key2 val1 key1  │
//! └─────────┴───────────────────────┴────────┴──────────────────────────┘
//!  0         2                                                      1024
//! ```
//!
//! - `N` counts index slots, not pairs, and is always even.
//! - Slot `2p+1` is the start offset of pair `p`'s key, slot `2p+2` the start
//!   of its value. A key ends where the previous pair's value starts (or at
//!   the page end for the first pair); a value ends where its key starts.
//! - Pair bytes grow downward from the end of the page, offsets are
//!   non-increasing with slot position.
//! - All integers are in host byte order. Page files are not portable across
//!   hosts of differing endianness.

mod split;

use std::fmt;

use crate::error::{DbmError, Result};

/// Size of a data page in bytes
pub const PAGE_SIZE: usize = 1024;

/// Largest combined key + value size accepted by the store
pub const PAIR_MAX: usize = 1008;

/// Width of one index slot
const SLOT: usize = std::mem::size_of::<u16>();

/// One data page, viewed through bounds-checked accessors
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    buf: [u8; PAGE_SIZE],
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("pairs", &self.pair_count())
            .field("free", &self.free_space())
            .finish()
    }
}

impl Page {
    /// Create an empty page
    pub fn new() -> Self {
        Self { buf: [0; PAGE_SIZE] }
    }

    /// Wrap raw page bytes (not validated)
    pub fn from_bytes(bytes: &[u8; PAGE_SIZE]) -> Self {
        Self { buf: *bytes }
    }

    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.buf
    }

    /// Raw buffer for loading from disk; call `is_valid` afterwards
    pub fn as_bytes_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.buf
    }

    // =========================================================================
    // Index Slots
    // =========================================================================

    fn slot(&self, i: usize) -> usize {
        let at = i * SLOT;
        usize::from(u16::from_ne_bytes([self.buf[at], self.buf[at + 1]]))
    }

    fn set_slot(&mut self, i: usize, value: usize) {
        let at = i * SLOT;
        // Offsets and counts never exceed PAGE_SIZE
        self.buf[at..at + SLOT].copy_from_slice(&(value as u16).to_ne_bytes());
    }

    /// Number of index slots in use (twice the pair count)
    pub fn slot_count(&self) -> usize {
        self.slot(0)
    }

    /// Number of stored pairs
    pub fn pair_count(&self) -> usize {
        self.slot_count() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// Offset of the lowest byte in the data region
    fn data_start(&self) -> usize {
        match self.slot_count() {
            0 => PAGE_SIZE,
            // Bogus count on an unvalidated page: report no room
            n if (n + 1) * SLOT > PAGE_SIZE => 0,
            n if self.slot(n) > PAGE_SIZE => 0,
            n => self.slot(n),
        }
    }

    /// Bytes between the end of the index array and the data region
    pub fn free_space(&self) -> usize {
        self.data_start()
            .saturating_sub((self.slot_count() + 1) * SLOT)
    }

    /// Whether a pair of `need` combined bytes (plus its two slots) fits
    pub fn fits(&self, need: usize) -> bool {
        need + 2 * SLOT <= self.free_space()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// (value start, key start, key end) of pair `p`, if the offsets are sane
    fn bounds(&self, p: usize) -> Option<(usize, usize, usize)> {
        if p >= self.pair_count() || (2 * p + 3) * SLOT > PAGE_SIZE {
            return None;
        }
        let top = if p == 0 { PAGE_SIZE } else { self.slot(2 * p) };
        let key_start = self.slot(2 * p + 1);
        let val_start = self.slot(2 * p + 2);

        (val_start <= key_start && key_start <= top && top <= PAGE_SIZE)
            .then_some((val_start, key_start, top))
    }

    /// Key and value of the `p`-th pair (0-based, insertion order)
    pub fn pair_at(&self, p: usize) -> Option<(&[u8], &[u8])> {
        let (val_start, key_start, key_end) = self.bounds(p)?;
        Some((&self.buf[key_start..key_end], &self.buf[val_start..key_start]))
    }

    /// Key of the `p`-th pair (0-based, insertion order)
    pub fn key_at(&self, p: usize) -> Option<&[u8]> {
        self.pair_at(p).map(|(key, _)| key)
    }

    /// Index of the pair holding `key`
    fn position(&self, key: &[u8]) -> Option<usize> {
        (0..self.pair_count()).find(|&p| self.key_at(p) == Some(key))
    }

    /// Value stored under `key`
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let p = self.position(key)?;
        self.pair_at(p).map(|(_, val)| val)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.position(key).is_some()
    }

    /// Iterate over all pairs in insertion order
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs { page: self, next: 0 }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a pair. Callers check `fits` first; a pair that does not fit
    /// is refused with `PageFull` and the page is left untouched.
    pub fn insert(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
        let need = key.len() + val.len();
        if !self.fits(need) {
            return Err(DbmError::PageFull {
                need,
                free: self.free_space(),
            });
        }

        let n = self.slot_count();
        let key_start = self.data_start() - key.len();
        self.buf[key_start..key_start + key.len()].copy_from_slice(key);
        let val_start = key_start - val.len();
        self.buf[val_start..key_start].copy_from_slice(val);

        self.set_slot(n + 1, key_start);
        self.set_slot(n + 2, val_start);
        self.set_slot(0, n + 2);
        Ok(())
    }

    /// Remove the pair holding `key`, closing the gap it leaves
    ///
    /// Returns whether a pair was removed. A page that fails `is_valid` is
    /// left untouched.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        if !self.is_valid() {
            return false;
        }
        let Some(p) = self.position(key) else {
            return false;
        };

        let n = self.slot_count();
        let i = 2 * p + 1;

        // The last pair only needs the count dropped
        if i < n - 1 {
            let top = if p == 0 { PAGE_SIZE } else { self.slot(i - 1) };
            let bottom = self.slot(i + 1);
            let gap = top - bottom;
            let low = self.slot(n);

            self.buf.copy_within(low..bottom, low + gap);
            for k in i..n - 1 {
                let shifted = self.slot(k + 2) + gap;
                self.set_slot(k, shifted);
            }
        }

        self.set_slot(0, n - 2);
        true
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Structural check run on every page loaded from disk
    ///
    /// The slot count must be even and leave room for its own index, and
    /// offsets must be non-increasing without reaching into the index.
    pub fn is_valid(&self) -> bool {
        let n = self.slot_count();
        if n % 2 != 0 || (n + 1) * SLOT > PAGE_SIZE {
            return false;
        }

        let mut top = PAGE_SIZE;
        for p in 0..n / 2 {
            let key_start = self.slot(2 * p + 1);
            let val_start = self.slot(2 * p + 2);
            if key_start > top || val_start > key_start {
                return false;
            }
            top = val_start;
        }

        top >= (n + 1) * SLOT
    }
}

/// Iterator over a page's pairs
pub struct Pairs<'a> {
    page: &'a Page,
    next: usize,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.page.pair_at(self.next)?;
        self.next += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.page.pair_count().saturating_sub(self.next);
        (left, Some(left))
    }
}
