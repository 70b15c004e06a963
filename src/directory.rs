//! Directory Bitmap
//!
//! Persistent bit-vector encoding an implicit binary trie over hash prefixes.
//! Bit `i` is a trie node; its children are `2i + 1` (next hash bit clear)
//! and `2i + 2` (next hash bit set). A set bit means the node's page has
//! been split. Bits are only ever set.
//!
//! The vector lives in `{name}.dir` and grows in 4096-byte blocks. One block
//! is cached at a time; every `set_bit` writes its block straight back.

use std::fs::File;

use tracing::trace;

use crate::block::{read_block, write_block};
use crate::error::Result;

/// Size of a directory block in bytes
pub const DIR_BLOCK_SIZE: usize = 4096;

/// Number of trie bits held by one directory block
pub const BITS_PER_BLOCK: u64 = DIR_BLOCK_SIZE as u64 * 8;

/// Directory bitmap with a single-block cache
pub struct Directory {
    /// Backing `.dir` file
    file: File,

    /// Cached block contents
    block: Box<[u8; DIR_BLOCK_SIZE]>,

    /// Which block `block` holds, if any
    block_no: Option<u64>,

    /// Bits addressable without reading past the directory's end.
    /// Grows monotonically as blocks are written.
    max_bits: u64,
}

impl Directory {
    /// Wrap an open `.dir` file
    pub fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();

        Ok(Self {
            file,
            block: Box::new([0; DIR_BLOCK_SIZE]),
            // An empty directory is all zeros, so block 0 is known already
            block_no: (len == 0).then_some(0),
            max_bits: len * 8,
        })
    }

    pub fn max_bits(&self) -> u64 {
        self.max_bits
    }

    /// Test the trie bit at `bit`
    pub fn get_bit(&mut self, bit: u64) -> Result<bool> {
        let (block_no, byte, mask) = Self::address(bit);
        self.load(block_no)?;
        Ok(self.block[byte] & mask != 0)
    }

    /// Set the trie bit at `bit` and write its block through to disk
    pub fn set_bit(&mut self, bit: u64) -> Result<()> {
        let (block_no, byte, mask) = Self::address(bit);
        self.load(block_no)?;

        self.block[byte] |= mask;
        if bit >= self.max_bits {
            self.max_bits = (block_no + 1) * BITS_PER_BLOCK;
        }

        write_block(&mut self.file, Self::offset(block_no), &self.block[..])?;
        Ok(())
    }

    /// Count every set bit in the directory file
    ///
    /// Reads the file block by block without disturbing the cache.
    pub fn count_set_bits(&mut self) -> Result<u64> {
        let blocks = self.file.metadata()?.len().div_ceil(DIR_BLOCK_SIZE as u64);
        let mut buf = vec![0u8; DIR_BLOCK_SIZE];
        let mut total = 0u64;

        for block_no in 0..blocks {
            read_block(&mut self.file, Self::offset(block_no), &mut buf)?;
            total += buf.iter().map(|b| u64::from(b.count_ones())).sum::<u64>();
        }

        Ok(total)
    }

    /// Flush the directory file to stable storage
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn load(&mut self, block_no: u64) -> Result<()> {
        if self.block_no == Some(block_no) {
            return Ok(());
        }

        // A failed read leaves the buffer in an unknown state
        self.block_no = None;
        read_block(&mut self.file, Self::offset(block_no), &mut self.block[..])?;
        trace!(block = block_no, "loaded directory block");
        self.block_no = Some(block_no);
        Ok(())
    }

    /// (block number, byte within block, bit mask) for a trie bit
    fn address(bit: u64) -> (u64, usize, u8) {
        let byte = bit / 8;
        let block_no = byte / DIR_BLOCK_SIZE as u64;
        let within = (byte % DIR_BLOCK_SIZE as u64) as usize;
        (block_no, within, 1 << (bit % 8))
    }

    fn offset(block_no: u64) -> u64 {
        block_no * DIR_BLOCK_SIZE as u64
    }
}
