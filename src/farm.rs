//! Faster (but not DoS-resistant) hashmap for frequency indices
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Farmhash, chained over every write
///
/// Farmhash isn't a streaming hash, so each write is hashed with the running
/// state as its seed. Composite keys (tuples, `Vec<String>`) hash every part.
pub struct FarmHasher(u64);

impl Default for FarmHasher {
    #[inline]
    fn default() -> FarmHasher {
        FarmHasher(0)
    }
}

impl Hasher for FarmHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = farmhash::hash64_with_seed(bytes, self.0);
    }
}

pub type Farm = BuildHasherDefault<FarmHasher>;
pub type FarmMap<X, Y> = HashMap<X, Y, Farm>;

pub fn new_farm<X: Hash + Eq, Y>() -> FarmMap<X, Y> {
    Default::default()
}
