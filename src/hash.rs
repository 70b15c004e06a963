//! Key hashing
//!
//! Polynomial rolling hash used to address pages. Not cryptographic.
//! Computed byte by byte, so the value is the same on every host.

/// Number of bits in a hash value (and the deepest the trie can go)
pub const HASH_BITS: u32 = u32::BITS;

/// Hash a key: `acc = b + 65599 * acc` for each byte
pub fn hash(key: &[u8]) -> u32 {
    key.iter()
        .fold(0u32, |acc, &b| u32::from(b).wrapping_add(acc.wrapping_mul(65599)))
}

/// Mask selecting the low `depth` bits of a hash
pub fn mask(depth: u32) -> u32 {
    if depth >= HASH_BITS {
        u32::MAX
    } else {
        (1u32 << depth) - 1
    }
}
