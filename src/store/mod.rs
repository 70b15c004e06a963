//! Store Module
//!
//! The `Dbm` handle: two backing files, a one-page cache, the directory
//! bitmap, and the page-file lock.
//!
//! ## Responsibilities
//! - Open/create `{name}.dir` and `{name}.pag` and lock the page file
//! - Route store/fetch/delete through the page locator
//! - Split pages when a pair does not fit
//! - Write every mutation straight back to disk
//! - Track the sticky I/O-error flag
//!
//! ## Lookup Path
//! ```text
//!   key ──hash──▶ trie walk over .dir bits ──mask──▶ page number
//!                                                       │
//!                                   cached? ◀───────────┘
//!                                    │   └─ no: read .pag block, validate
//!                                    ▼
//!                               scan page pairs
//! ```

mod iter;
mod locate;
mod split;

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, error, trace};

use crate::block::{read_block, write_block};
use crate::config::{Config, OpenMode};
use crate::directory::Directory;
use crate::error::{DbmError, Result};
use crate::hash::hash;
use crate::lock::{self, LockKind};
use crate::page::{Page, PAGE_SIZE, PAIR_MAX};

pub use iter::Keys;

use iter::Cursor;

/// How `store` treats a key that is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Leave the existing pair alone and report `StoreStatus::Exists`
    Insert,

    /// Overwrite the existing pair
    Replace,
}

/// Outcome of a successful `store` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// The pair was written
    Stored,

    /// Insert mode found the key already present; nothing was written
    Exists,
}

/// An open key-value store
///
/// ## Concurrency Model
///
/// A handle is single-threaded: every operation takes `&mut self`, blocks
/// on file I/O, and persists before returning. Between processes, the page
/// file's advisory lock (exclusive for writers, shared for readers) is held
/// from `open` until `close` or drop.
///
/// Values and keys returned by lookups borrow the handle's page cache and
/// are only valid until the next call.
pub struct Dbm {
    /// Store configuration
    config: Config,

    /// `{name}.dir` path
    dir_path: PathBuf,

    /// `{name}.pag` path
    pag_path: PathBuf,

    /// Page file (also carries the lock)
    pag: File,

    /// Directory bitmap over the `.dir` file
    directory: Directory,

    /// Fixed at open
    read_only: bool,

    /// Sticky I/O-error flag, cleared only by `clear_error`
    io_error: bool,

    /// Most recently used page
    page: Page,

    /// Page number held in `page`, if any
    page_no: Option<u64>,

    /// Hash mask reached by the last locate
    hmask: u32,

    /// Trie bit reached by the last locate
    cur_bit: u64,

    /// Sequential scan position for first_key/next_key
    cursor: Cursor,
}

impl Dbm {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const DIR_SUFFIX: &'static str = ".dir";
    const PAG_SUFFIX: &'static str = ".pag";

    /// Open or create a store with the given config
    ///
    /// On open:
    /// 1. Open/create the directory and page files
    /// 2. Lock the page file (exclusive if writable, shared otherwise)
    /// 3. Truncate both files if requested
    /// 4. Size the directory from the `.dir` file length
    pub fn open(config: Config) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(DbmError::InvalidArgument("empty store name".to_string()));
        }

        // Step 1: Open both files
        let dir_path = Self::with_suffix(&config.path, Self::DIR_SUFFIX);
        let pag_path = Self::with_suffix(&config.path, Self::PAG_SUFFIX);
        let dir = Self::open_file(&dir_path, &config)?;
        let pag = Self::open_file(&pag_path, &config)?;

        // Step 2: Lock before touching contents
        let read_only = !config.mode.is_writable();
        let kind = if read_only {
            LockKind::Shared
        } else {
            LockKind::Exclusive
        };
        lock::acquire(&pag, &pag_path, kind, config.lock)?;

        // Step 3: Truncate under the lock
        if config.mode == OpenMode::Truncate {
            dir.set_len(0)?;
            pag.set_len(0)?;
        }

        // Step 4: Directory state comes from the file size
        let directory = Directory::new(dir)?;

        debug!(
            path = %config.path.display(),
            mode = ?config.mode,
            max_bits = directory.max_bits(),
            "opened store"
        );

        Ok(Self {
            config,
            dir_path,
            pag_path,
            pag,
            directory,
            read_only,
            io_error: false,
            page: Page::new(),
            page_no: None,
            hmask: 0,
            cur_bit: 0,
            cursor: Cursor::default(),
        })
    }

    /// Open with a base name and mode (convenience method)
    ///
    /// Uses default config otherwise
    pub fn open_path(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).mode(mode).build();
        Self::open(config)
    }

    /// Store a pair
    ///
    /// Steps:
    /// 1. Reject read-only handles and oversized pairs
    /// 2. Locate the key's page
    /// 3. Drop an existing pair (replace) or stop (insert)
    /// 4. Split until the page has room
    /// 5. Insert and write the page back
    pub fn store(&mut self, key: &[u8], value: &[u8], mode: StoreMode) -> Result<StoreStatus> {
        Self::check_key(key)?;
        if self.read_only {
            return Err(DbmError::ReadOnly);
        }

        let need = key.len() + value.len();
        if need > PAIR_MAX {
            return Err(DbmError::PairTooLarge {
                size: need,
                max: PAIR_MAX,
            });
        }

        let stored = self.store_pair(key, value, mode, need);
        self.track(stored)
    }

    /// Look up the value stored under `key`
    pub fn fetch(&mut self, key: &[u8]) -> Result<Option<&[u8]>> {
        Self::check_key(key)?;

        let located = self.locate(hash(key));
        self.track(located)?;

        Ok(self.page.get(key))
    }

    /// Whether `key` is present
    pub fn contains(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.fetch(key)?.is_some())
    }

    /// Remove the pair stored under `key`
    ///
    /// Returns `false` if the key was absent (not an error).
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Self::check_key(key)?;
        if self.read_only {
            return Err(DbmError::ReadOnly);
        }

        let removed = self.delete_pair(key);
        self.track(removed)
    }

    /// Flush both files to stable storage
    ///
    /// Mutations are already written when they return; this adds the
    /// durability barrier the OS write-back cache otherwise defers.
    pub fn sync(&mut self) -> Result<()> {
        let synced = self.sync_files();
        self.track(synced)
    }

    /// Close the store, releasing the lock
    ///
    /// Nothing is pending: every mutation was written when it returned.
    pub fn close(self) -> Result<()> {
        lock::release(&self.pag)?;
        debug!(path = %self.config.path.display(), "closed store");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether an I/O failure has occurred since open or the last clear
    pub fn has_error(&self) -> bool {
        self.io_error
    }

    /// Reset the sticky I/O-error flag
    pub fn clear_error(&mut self) {
        self.io_error = false;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Path of the directory bitmap file
    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    /// Path of the page file
    pub fn pag_path(&self) -> &Path {
        &self.pag_path
    }

    /// Number of page-sized blocks in the page file (including holes)
    pub fn page_count(&self) -> Result<u64> {
        let len = self.pag.metadata()?.len();
        Ok(len.div_ceil(PAGE_SIZE as u64))
    }

    /// Number of split trie nodes recorded in the directory
    pub fn directory_bits_set(&mut self) -> Result<u64> {
        let counted = self.directory.count_set_bits();
        self.track(counted)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn store_pair(
        &mut self,
        key: &[u8],
        value: &[u8],
        mode: StoreMode,
        need: usize,
    ) -> Result<StoreStatus> {
        let hash = hash(key);
        let mut page_no = self.locate(hash)?;

        match mode {
            StoreMode::Replace => {
                self.page.remove(key);
            }
            StoreMode::Insert => {
                if self.page.contains(key) {
                    return Ok(StoreStatus::Exists);
                }
            }
        }

        if !self.page.fits(need) {
            page_no = self.make_room(hash, need, page_no)?;
        }

        self.page.insert(key, value)?;
        self.write_cached(page_no)?;
        Ok(StoreStatus::Stored)
    }

    fn delete_pair(&mut self, key: &[u8]) -> Result<bool> {
        let page_no = self.locate(hash(key))?;
        if !self.page.remove(key) {
            return Ok(false);
        }

        self.write_cached(page_no)?;
        Ok(true)
    }

    fn sync_files(&mut self) -> Result<()> {
        self.directory.sync()?;
        self.pag.sync_all()?;
        Ok(())
    }

    /// Make `page_no` the cached page, reading and validating it on a miss
    fn load_page(&mut self, page_no: u64) -> Result<()> {
        if self.page_no == Some(page_no) {
            return Ok(());
        }

        // A failed read or bad page must not stay cached
        self.page_no = None;
        read_block(&mut self.pag, Self::page_offset(page_no), self.page.as_bytes_mut())?;
        if !self.page.is_valid() {
            error!(
                path = %self.pag_path.display(),
                page = page_no,
                "page failed validation"
            );
            return Err(DbmError::CorruptPage { page: page_no });
        }

        trace!(page = page_no, "loaded page");
        self.page_no = Some(page_no);
        Ok(())
    }

    /// Write the cached page out as `page_no`
    fn write_cached(&mut self, page_no: u64) -> Result<()> {
        write_block(&mut self.pag, Self::page_offset(page_no), self.page.as_bytes())?;
        Ok(())
    }

    /// Write an arbitrary page out as `page_no`
    fn write_page(&mut self, page_no: u64, page: &Page) -> Result<()> {
        write_block(&mut self.pag, Self::page_offset(page_no), page.as_bytes())?;
        Ok(())
    }

    /// Raise the sticky flag for I/O-class failures
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_io() {
                self.io_error = true;
            }
        }
        result
    }

    fn check_key(key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(DbmError::InvalidArgument("empty key".to_string()));
        }
        Ok(())
    }

    fn page_offset(page_no: u64) -> u64 {
        page_no * PAGE_SIZE as u64
    }

    /// "{base}{suffix}", keeping any dots already in the base name
    fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
        let mut name = OsString::from(base.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn open_file(path: &Path, config: &Config) -> Result<File> {
        let mut options = OpenOptions::new();
        options.read(true);
        match config.mode {
            OpenMode::ReadOnly => {}
            OpenMode::ReadWrite => {
                options.write(true);
            }
            OpenMode::Create | OpenMode::Truncate => {
                options.write(true).create(true);
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(config.permissions);
        }

        Ok(options.open(path)?)
    }
}
