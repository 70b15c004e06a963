//! Advisory whole-file locking
//!
//! A store handle locks its page file for its whole lifetime: exclusively
//! when writable, shared when read-only. The lock is advisory (`flock` on
//! Unix, `LockFileEx` on Windows), so only cooperating processes are
//! serialized. Closing the file releases it, even if the process dies.

use std::fs::File;
use std::io;
use std::path::Path;

use fs2::FileExt;
use tracing::{debug, error};

use crate::config::LockBehavior;
use crate::error::{DbmError, Result};

/// Kind of lock held on the page file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    /// Many readers may hold it at once
    Shared,

    /// A single writer, no readers
    Exclusive,
}

/// Acquire `kind` on `file`, waiting or failing fast per `behavior`
pub fn acquire(file: &File, path: &Path, kind: LockKind, behavior: LockBehavior) -> Result<()> {
    let outcome = match (kind, behavior) {
        (LockKind::Shared, LockBehavior::Block) => FileExt::lock_shared(file),
        (LockKind::Exclusive, LockBehavior::Block) => FileExt::lock_exclusive(file),
        (LockKind::Shared, LockBehavior::Fail) => FileExt::try_lock_shared(file),
        (LockKind::Exclusive, LockBehavior::Fail) => FileExt::try_lock_exclusive(file),
    };

    match outcome {
        Ok(()) => {
            debug!(path = %path.display(), ?kind, "acquired page file lock");
            Ok(())
        }
        Err(e) if is_contended(&e) => {
            debug!(path = %path.display(), ?kind, "page file lock is held elsewhere");
            Err(DbmError::Locked(path.to_path_buf()))
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to lock page file");
            Err(DbmError::Io(e))
        }
    }
}

/// Release whatever lock is held on `file`
pub fn release(file: &File) -> Result<()> {
    FileExt::unlock(file)?;
    Ok(())
}

/// Some platforms report contention as a raw EWOULDBLOCK/EAGAIN
/// instead of `ErrorKind::WouldBlock`
fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || matches!(e.raw_os_error(), Some(11) | Some(35))
}
