//! Page splitting
//!
//! Redistributes a full page's pairs across two pages using one more hash bit.

use crate::error::Result;
use crate::hash::hash;

use super::Page;

impl Page {
    /// Split into `(stay, moved)`: pairs whose key hash has `bit` set go to
    /// `moved`, the rest to `stay`. Relative order is preserved on both sides.
    pub fn split(&self, bit: u32) -> Result<(Page, Page)> {
        let mut stay = Page::new();
        let mut moved = Page::new();

        for (key, val) in self.pairs() {
            let dest = if hash(key) & bit != 0 {
                &mut moved
            } else {
                &mut stay
            };
            dest.insert(key, val)?;
        }

        Ok((stay, moved))
    }
}
