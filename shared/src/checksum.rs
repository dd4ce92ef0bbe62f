use crc32fast::Hasher;

/// CRC-32 over a snapshot blob, computed before framing on the sender and
/// after unframing on the receiver. A mismatch means the reassembled blob is
/// not the one that was sent (lost chunk, reorder across a reset, or
/// corruption) and the transfer must be treated as failed.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
