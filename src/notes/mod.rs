//! Notes-based coordination between git-depend runs.
//!
//! Each repository carries two notes refs:
//!
//! - `refs/notes/git-depend-lock` ([`LOCK_REF`]): an exclusive, short-lived
//!   lock. Its resting state is empty. A note means an operation is in flight.
//! - `refs/notes/git-depend` ([`DEPS_REF`]): the durable record of the
//!   repository's direct dependencies, replaced on every write.
//!
//! The lock is advisory. Writers do not prevent each other from adding a note;
//! instead every writer re-reads the lock ref after pushing and fails with
//! [`DependError::MultipleLocks`](crate::core::DependError::MultipleLocks) if
//! more than one note is present, after taking its own note back. A concurrent
//! push of the same ref is rejected by the remote as non-fast-forward.
//!
//! [`LOCK_REF`]: crate::constants::LOCK_REF
//! [`DEPS_REF`]: crate::constants::DEPS_REF

pub mod deps;
pub mod lock;

pub use deps::{read_dependency_notes, write_all_dependency_notes, write_dependency_notes};
pub use lock::{HeldLock, Lock, clear_locks, read_lock, remove_lock, write_lock};
