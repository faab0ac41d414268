//! Key Routing Module
//!
//! Maps string keys onto shards with a 32-bit FNV-1a hash.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

// == FNV-1a ==
/// Computes the 32-bit FNV-1a hash of `bytes`.
#[inline]
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

// == Shard Index ==
/// Returns the shard a key belongs to.
///
/// `shard_count` must be a power of two so that masking is equivalent to
/// taking the remainder.
#[inline]
pub fn shard_index(key: &str, shard_count: usize) -> usize {
    debug_assert!(shard_count.is_power_of_two());
    (fnv1a_32(key.as_bytes()) as usize) & (shard_count - 1)
}
