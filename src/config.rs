//! Configuration for hashdbm
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// How a store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open existing files for lookups only; mutations are rejected
    ReadOnly,

    /// Open existing files for reading and writing
    ReadWrite,

    /// Like `ReadWrite`, creating missing files
    Create,

    /// Like `Create`, emptying both files if they already exist
    Truncate,
}

impl OpenMode {
    /// Whether this mode permits mutations
    pub fn is_writable(self) -> bool {
        !matches!(self, OpenMode::ReadOnly)
    }
}

/// What to do when another handle already holds the page-file lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockBehavior {
    /// Wait until the lock is granted
    Block,

    /// Fail immediately with `DbmError::Locked`
    Fail,
}

/// Main configuration for a hashdbm store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Base name of the store. Backing files:
    ///   {path}.dir   (directory bitmap)
    ///   {path}.pag   (data pages)
    pub path: PathBuf,

    /// Open mode, fixed for the handle's lifetime
    pub mode: OpenMode,

    /// Unix permission bits applied to newly created files
    pub permissions: u32,

    // -------------------------------------------------------------------------
    // Locking Configuration
    // -------------------------------------------------------------------------
    /// Behavior when the advisory lock is contended
    pub lock: LockBehavior,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./hashdbm"),
            mode: OpenMode::Create,
            permissions: 0o644,
            lock: LockBehavior::Block,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store base name
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the open mode
    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the permission bits for newly created files
    pub fn permissions(mut self, permissions: u32) -> Self {
        self.config.permissions = permissions;
        self
    }

    /// Set the lock contention behavior
    pub fn lock(mut self, lock: LockBehavior) -> Self {
        self.config.lock = lock;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
