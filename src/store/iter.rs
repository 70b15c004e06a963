//! Sequential key scan
//!
//! Walks the page file block by block from block 0, independent of the
//! directory trie. Holes read as empty pages and are skipped; the scan ends
//! at end of file. A block that fails validation stops the scan with an error.

use crate::error::Result;

use super::Dbm;

/// Scan position: block number and next pair within it
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Cursor {
    block: u64,
    next: usize,
}

impl Dbm {
    /// Restart the scan and return the first key
    pub fn first_key(&mut self) -> Result<Option<&[u8]>> {
        self.cursor = Cursor::default();
        self.next_key()
    }

    /// Return the key after the previous one returned by the scan
    ///
    /// Without a prior `first_key`, starts at block 0.
    pub fn next_key(&mut self) -> Result<Option<&[u8]>> {
        let advanced = self.advance();
        match self.track(advanced)? {
            Some(p) => Ok(self.page.key_at(p)),
            None => Ok(None),
        }
    }

    /// Iterate over every key as an owned copy
    pub fn keys(&mut self) -> Keys<'_> {
        Keys {
            db: self,
            started: false,
            done: false,
        }
    }

    /// Move the cursor to the next stored pair, leaving its page cached
    fn advance(&mut self) -> Result<Option<usize>> {
        let len = self.pag.metadata()?.len();

        loop {
            if Self::page_offset(self.cursor.block) >= len {
                return Ok(None);
            }

            self.load_page(self.cursor.block)?;

            let p = self.cursor.next;
            if p < self.page.pair_count() {
                self.cursor.next += 1;
                return Ok(Some(p));
            }

            self.cursor = Cursor {
                block: self.cursor.block + 1,
                next: 0,
            };
        }
    }
}

/// Owned-key iterator over a store, built on `first_key`/`next_key`
pub struct Keys<'a> {
    db: &'a mut Dbm,
    started: bool,
    done: bool,
}

impl Iterator for Keys<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let step = if self.started {
            self.db.next_key()
        } else {
            self.started = true;
            self.db.first_key()
        };

        match step {
            Ok(Some(key)) => Some(Ok(key.to_vec())),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
