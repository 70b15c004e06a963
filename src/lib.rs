//! # hashdbm
//!
//! An embedded, single-writer key-value store built on extendible hashing:
//! - Fixed 1024-byte data pages addressed by key hash
//! - A persistent bit-trie directory that grows as pages split
//! - Synchronous write-through on every mutation
//! - Whole-file advisory locking between processes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Dbm handle                           │
//! │     store / fetch / delete / first_key / next_key           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ hash(key)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Page locator                           │
//! │           (trie walk over directory bits → mask)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Directory  │          │    Page     │
//!   │ (name.dir)  │          │ (name.pag)  │
//!   │ 4 KB blocks │          │ 1 KB pages  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use hashdbm::{Dbm, OpenMode, StoreMode};
//!
//! # fn main() -> hashdbm::Result<()> {
//! let mut db = Dbm::open_path("/tmp/people", OpenMode::Create)?;
//! db.store(b"alice", b"30", StoreMode::Insert)?;
//! assert_eq!(db.fetch(b"alice")?, Some(&b"30"[..]));
//! db.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod hash;
pub mod block;
pub mod page;
pub mod directory;
pub mod lock;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbmError, Result};
pub use config::{Config, LockBehavior, OpenMode};
pub use page::{PAGE_SIZE, PAIR_MAX};
pub use store::{Dbm, Keys, StoreMode, StoreStatus};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hashdbm
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
