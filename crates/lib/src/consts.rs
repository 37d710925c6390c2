//! Crate-wide constants.

/// Separator between segments of a module path, e.g. `:app:feature`.
pub const MODULE_SEPARATOR: char = ':';

/// Default manifest file name, looked up in the current directory.
pub const DEFAULT_MANIFEST: &str = "affected.toml";

/// Revision used when no commit ids have been specified.
pub const HEAD: &str = "HEAD";
