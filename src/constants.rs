//! Global constants used throughout the git-depend codebase.
//!
//! Notes ref names, remote names and environment variable names live here so
//! the lock protocol, the cache and the command line agree on them.

/// Notes ref carrying the ephemeral per-repository lock.
///
/// Resting state is empty; a note here means an operation is in flight.
pub const LOCK_REF: &str = "git-depend-lock";

/// Notes ref carrying the durable dependency record of a repository.
pub const DEPS_REF: &str = "git-depend";

/// Remote every mirror is cloned from.
pub const REMOTE: &str = "origin";

/// Staging directory under the cache root used while cloning.
pub const STAGING_DIR: &str = "tmp";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "GIT_DEPEND_CONFIG";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "GIT_DEPEND_CACHE_DIR";

/// File name of the configuration file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".git-depend.toml";
