//! Room-maker
//!
//! Splits the located page with successive hash bits until the page that
//! the pending pair addresses has room for it.

use tracing::{debug, warn};

use crate::error::{DbmError, Result};

use super::locate::child;
use super::Dbm;

/// Splits attempted for one pair before giving up
const SPLIT_MAX: usize = 10;

impl Dbm {
    /// Split until the pair hashing to `hash` fits in `need` bytes
    ///
    /// `page_no` is the page `locate` just cached. Returns the page the pair
    /// now belongs on, which is left cached. On failure the cache is dropped
    /// so the next operation rereads from disk.
    pub(super) fn make_room(&mut self, hash: u32, need: usize, page_no: u64) -> Result<u64> {
        let result = self.split_until_fits(hash, need, page_no);
        if result.is_err() {
            self.page_no = None;
        }
        result
    }

    fn split_until_fits(&mut self, hash: u32, need: usize, mut page_no: u64) -> Result<u64> {
        for _ in 0..SPLIT_MAX {
            // Every hash bit is already in use
            if self.hmask == u32::MAX {
                break;
            }

            let split_bit = self.hmask + 1;
            let sibling = u64::from(hash & self.hmask) | u64::from(split_bit);
            let (stay, moved) = self.page.split(split_bit)?;

            debug!(
                page = page_no,
                sibling,
                trie_bit = self.cur_bit,
                stay = stay.pair_count(),
                moved = moved.pair_count(),
                "splitting page"
            );

            // Persist whichever half the pair is not headed for
            if hash & split_bit != 0 {
                self.write_page(page_no, &stay)?;
                self.page = moved;
                page_no = sibling;
                self.page_no = Some(sibling);
            } else {
                self.write_page(sibling, &moved)?;
                self.page = stay;
            }

            self.directory.set_bit(self.cur_bit)?;
            if self.page.fits(need) {
                return Ok(page_no);
            }

            // Still full: descend and persist before splitting again
            self.cur_bit = child(self.cur_bit, hash, split_bit);
            self.hmask |= split_bit;
            self.write_cached(page_no)?;
        }

        warn!(need, "cannot insert pair after {} splits", SPLIT_MAX);
        Err(DbmError::CannotMakeRoom {
            attempts: SPLIT_MAX,
        })
    }
}
