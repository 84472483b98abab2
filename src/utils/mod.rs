//! Shared utilities.

mod hash;

pub use hash::{content_hash, sha256_file, sha256_hex};
