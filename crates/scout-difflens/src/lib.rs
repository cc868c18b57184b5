//! Pure diff handling: splitting, filtering, and size-bounded payload assembly.
//!
//! Nothing in this crate touches the network or the filesystem, so every
//! function here is deterministic given its inputs.

pub mod filter;
pub mod parser;
pub mod payload;
