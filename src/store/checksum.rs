//! CRC32 checksums for schema log records
//!
//! Every record carries a checksum over its length prefix, header and
//! payload. Any mismatch is corruption.

use crc32fast::Hasher;

/// Computes a CRC32 (IEEE) checksum over `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Returns true if `data` hashes to `expected`.
pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        let data = br#"{"op":"create_class","name":"Person"}"#;
        assert_eq!(compute_checksum(data), compute_checksum(data));
    }

    #[test]
    fn test_checksum_detects_single_bit_flip() {
        let mut data = br#"{"op":"drop_class","name":"A"}"#.to_vec();
        let original = compute_checksum(&data);
        data[7] ^= 0x01;
        assert!(!verify_checksum(&data, original));
    }
}
