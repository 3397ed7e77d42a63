//! Seeded rolling hash over line and word bytes.
//!
//! Line hashes drive the block-level diff and move detection; word hashes
//! drive the intra-line diff. Hashing is context free: a line's hash depends
//! only on its own bytes and the active settings, never on surrounding lines.

use crate::config::CompareConfig;

/// Accumulator seed. A line that contributes no bytes after filtering keeps
/// this value and is treated as blank by move detection.
pub(crate) const HASH_SEED: u64 = 0x8422_2325;

/// Mix one byte into the accumulator (unsigned 64-bit, wrapping).
#[inline]
pub(crate) fn mix_byte(acc: u64, byte: u8) -> u64 {
    let h = acc ^ u64::from(byte);
    h.wrapping_add(
        (h << 1)
            .wrapping_add(h << 4)
            .wrapping_add(h << 5)
            .wrapping_add(h << 7)
            .wrapping_add(h << 8)
            .wrapping_add(h << 40),
    )
}

/// Hash a line's raw bytes, honoring the case and whitespace settings.
pub(crate) fn hash_line(bytes: &[u8], config: &CompareConfig) -> u64 {
    let mut hash = HASH_SEED;
    for &raw in bytes {
        let byte = if config.ignore_case {
            raw.to_ascii_lowercase()
        } else {
            raw
        };
        if config.ignore_spaces && (byte == b' ' || byte == b'\t') {
            continue;
        }
        hash = mix_byte(hash, byte);
    }
    hash
}

#[inline]
pub(crate) fn is_blank_hash(hash: u64) -> bool {
    hash == HASH_SEED
}
