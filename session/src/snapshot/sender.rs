use tether_shared::{crc32, SnapshotChunk, SnapshotComplete, SnapshotStart};

use crate::transport::PeerId;

use super::frame_blob;

/// Sender-side state for one in-flight transfer. One exists per receiving
/// peer; destroyed on ack or disconnect.
pub struct SnapshotSendState {
    pub peer: PeerId,
    framed: Vec<u8>,
    chunk_bytes: usize,
    total_chunks: usize,
    next_chunk: usize,
    checksum: u32,
    label: String,
    complete_sent: bool,
}

impl SnapshotSendState {
    /// Frames the blob, computes the checksum over the unframed bytes, and
    /// fixes the chunk layout.
    pub fn new(peer: PeerId, blob: &[u8], chunk_bytes: usize, label: String) -> Self {
        debug_assert!(chunk_bytes > 0);
        let checksum = crc32(blob);
        let framed = frame_blob(blob);
        let total_chunks = framed.len().div_ceil(chunk_bytes).max(1);
        Self {
            peer,
            framed,
            chunk_bytes,
            total_chunks,
            next_chunk: 0,
            checksum,
            label,
            complete_sent: false,
        }
    }

    pub fn start_message(&self) -> SnapshotStart {
        SnapshotStart {
            total_len: self.framed.len() as i64,
            chunk_count: self.total_chunks as i32,
            label: self.label.clone(),
        }
    }

    /// Produces up to `budget` chunks, in index order, advancing the cursor.
    pub fn next_chunks(&mut self, budget: usize) -> Vec<SnapshotChunk> {
        let mut chunks = Vec::new();
        while self.next_chunk < self.total_chunks && chunks.len() < budget {
            let begin = self.next_chunk * self.chunk_bytes;
            let end = (begin + self.chunk_bytes).min(self.framed.len());
            chunks.push(SnapshotChunk {
                index: self.next_chunk as i32,
                data: self.framed[begin..end].to_vec(),
            });
            self.next_chunk += 1;
        }
        chunks
    }

    pub fn all_chunks_sent(&self) -> bool {
        self.next_chunk >= self.total_chunks
    }

    pub fn complete_message(&mut self) -> Option<SnapshotComplete> {
        if !self.all_chunks_sent() || self.complete_sent {
            return None;
        }
        self.complete_sent = true;
        Some(SnapshotComplete {
            checksum: self.checksum,
        })
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// `chunks_sent / total_chunks`.
    pub fn progress(&self) -> f32 {
        self.next_chunk as f32 / self.total_chunks as f32
    }
}
