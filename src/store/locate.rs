//! Page locator
//!
//! Walks the directory trie from the root, consuming one hash bit per level
//! while the current node is split. The depth reached fixes the mask, and
//! `hash & mask` is the page number.

use crate::error::Result;
use crate::hash::{mask, HASH_BITS};

use super::Dbm;

/// Child of trie node `bit` on the side selected by `hash & hash_bit`
pub(super) fn child(bit: u64, hash: u32, hash_bit: u32) -> u64 {
    2 * bit + if hash & hash_bit != 0 { 2 } else { 1 }
}

impl Dbm {
    /// Find and cache the page that holds (or would hold) `hash`
    ///
    /// Leaves `cur_bit` and `hmask` at the leaf reached, for the splitter.
    pub(super) fn locate(&mut self, hash: u32) -> Result<u64> {
        let mut bit = 0u64;
        let mut depth = 0u32;

        while depth < HASH_BITS
            && bit < self.directory.max_bits()
            && self.directory.get_bit(bit)?
        {
            bit = child(bit, hash, 1 << depth);
            depth += 1;
        }

        self.cur_bit = bit;
        self.hmask = mask(depth);

        let page_no = u64::from(hash & self.hmask);
        self.load_page(page_no)?;
        Ok(page_no)
    }
}
