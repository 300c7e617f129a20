//! Deterministic hashing helpers. The standard library `HashMap` seeds its hasher randomly, so
//! the crate's maps use `FxHashMap` instead, and per-stream RNG seeds are derived with xxh3.
//!
//! `FxHashMap` has no `new` method; create maps with `HashMap::default()`.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::FxHashMap as HashMap;

/// A convenience method to compute a stable hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}
