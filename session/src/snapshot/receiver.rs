use log::{trace, warn};

use tether_shared::{crc32, SnapshotChunk, SnapshotStart};

use crate::error::SessionError;

use super::unframe_blob;

/// Upper bound on a declared transfer size; anything larger is treated as a
/// malformed start message rather than allocating blindly.
const MAX_DECLARED_CHUNKS: i32 = 1 << 20;

/// Upper bound on the payload one chunk may carry. No transport we target
/// moves a larger single message, so a declared total beyond
/// `chunk_count * MAX_CHUNK_DATA_BYTES` can never arrive and is rejected up
/// front.
const MAX_CHUNK_DATA_BYTES: u64 = 64 * 1024;

/// Receiver-side state for the one in-flight inbound transfer.
///
/// Created on a start message, destroyed on completion, checksum failure, or
/// disconnect. Chunks arrive sparsely; the array fills until the complete
/// message triggers reassembly.
pub struct SnapshotReceiveState {
    expected_total: usize,
    chunks: Vec<Option<Vec<u8>>>,
    received: usize,
    label: String,
}

impl SnapshotReceiveState {
    pub fn new(start: &SnapshotStart) -> Result<Self, SessionError> {
        if start.chunk_count <= 0 || start.chunk_count > MAX_DECLARED_CHUNKS {
            return Err(SessionError::MalformedMessage(
                tether_shared::DecodeError::LengthOutOfBounds {
                    declared: start.chunk_count.unsigned_abs() as usize,
                    remaining: MAX_DECLARED_CHUNKS as usize,
                },
            ));
        }
        let max_total = start.chunk_count as u64 * MAX_CHUNK_DATA_BYTES;
        if start.total_len < 0 || start.total_len as u64 > max_total {
            return Err(SessionError::MalformedMessage(
                tether_shared::DecodeError::LengthOutOfBounds {
                    declared: start.total_len.unsigned_abs() as usize,
                    remaining: max_total as usize,
                },
            ));
        }
        Ok(Self {
            expected_total: start.total_len as usize,
            chunks: vec![None; start.chunk_count as usize],
            received: 0,
            label: start.label.clone(),
        })
    }

    /// Stores a chunk at its declared index. Indices outside the declared
    /// range are ignored: a late or duplicate chunk arriving after a reset
    /// is a no-op, not an error.
    pub fn store_chunk(&mut self, chunk: SnapshotChunk) {
        let Ok(index) = usize::try_from(chunk.index) else {
            trace!("ignoring chunk with negative index {}", chunk.index);
            return;
        };
        let Some(slot) = self.chunks.get_mut(index) else {
            trace!("ignoring chunk {index} outside declared range");
            return;
        };
        if slot.is_none() {
            self.received += 1;
        }
        *slot = Some(chunk.data);
    }

    /// Concatenates the chunks in index order, unframes, and verifies the
    /// checksum. Missing chunks leave a gap, so the recomputed checksum
    /// disagrees and the buffer is discarded.
    pub fn assemble(self, expected_checksum: u32) -> Result<Vec<u8>, SessionError> {
        // sized from the bytes actually held, never the declared total
        let received_len: usize = self.chunks.iter().flatten().map(Vec::len).sum();
        let mut framed = Vec::with_capacity(received_len);
        for slot in &self.chunks {
            if let Some(data) = slot {
                framed.extend_from_slice(data);
            }
        }
        if framed.len() != self.expected_total {
            warn!(
                "snapshot '{}' reassembled to {} bytes, expected {}",
                self.label,
                framed.len(),
                self.expected_total
            );
        }
        let computed = match unframe_blob(&framed) {
            Ok(blob) => crc32(blob),
            // structurally broken framing can never match the sender's
            // checksum over the original blob
            Err(_) => crc32(&framed),
        };
        if computed != expected_checksum {
            return Err(SessionError::IntegrityMismatch {
                expected: expected_checksum,
                computed,
            });
        }
        let blob = unframe_blob(&framed)
            .map_err(|_| SessionError::IntegrityMismatch {
                expected: expected_checksum,
                computed,
            })?
            .to_vec();
        Ok(blob)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `chunks_received / chunk_count`.
    pub fn progress(&self) -> f32 {
        self.received as f32 / self.chunks.len() as f32
    }
}
