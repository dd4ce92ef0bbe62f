//! Snapshot bootstrap transfer messages.
//!
//! A transfer is one `SnapshotStart`, the declared number of
//! `SnapshotChunk`s, then a `SnapshotComplete` carrying the CRC-32 of the
//! unframed blob. The receiver answers with a single `SnapshotAck`.

use crate::serde::{ByteReader, ByteWriter, DecodeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStart {
    /// Total length of the framed payload in bytes.
    pub total_len: i64,
    pub chunk_count: i32,
    /// Human-readable label for progress display, e.g. a save name.
    pub label: String,
}

impl SnapshotStart {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i64(self.total_len);
        writer.write_i32(self.chunk_count);
        writer.write_string(&self.label);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            total_len: reader.read_i64()?,
            chunk_count: reader.read_i32()?,
            label: reader.read_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotChunk {
    pub index: i32,
    pub data: Vec<u8>,
}

impl SnapshotChunk {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.index);
        writer.write_blob(&self.data);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            index: reader.read_i32()?,
            data: reader.read_blob()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotComplete {
    /// CRC-32 over the unframed blob.
    pub checksum: u32,
}

impl SnapshotComplete {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.checksum);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            checksum: reader.read_u32()?,
        })
    }
}

/// Receiver -> sender outcome report. Also sent by the sender with
/// `success: false` when it has to abort a transfer it announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotAck {
    pub success: bool,
}

impl SnapshotAck {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_bool(self.success);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            success: reader.read_bool()?,
        })
    }
}
