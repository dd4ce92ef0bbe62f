//! # Tether Shared
//! Common functionality shared between the host and client sides of a tether
//! session: the wire codec, the message catalog, checksums, and timing
//! primitives.

#![deny(trivial_casts, trivial_numeric_casts, unstable_features, unused_import_braces)]

mod backends;
mod checksum;
mod constants;
mod key_generator;
mod messages;
mod serde;
mod types;

pub use backends::Timer;
pub use checksum::crc32;
pub use constants::{
    CHANGE_BATCH_SIZE, DEFAULT_PORT, HEARTBEAT_INTERVAL, HOST_PLAYER_ID, MAX_TURN_RATE_DEGREES,
    MIN_MOVE_DISTANCE, MIN_TURN_DEGREES, POSITION_SMOOTHING_RATE, SNAPSHOT_CHUNKS_PER_TICK,
    SNAPSHOT_CHUNK_BYTES, TELEPORT_DISTANCE, TRANSFORM_SAMPLE_INTERVAL,
};
pub use key_generator::KeyGenerator;
pub use messages::{
    ChangeKind, Hello, Message, MessageType, ObjectChangeEvent, PeerJoined, PeerLeft, Ping, Pong,
    SnapshotAck, SnapshotChunk, SnapshotComplete, SnapshotStart, TransformSample, Welcome,
};
pub use serde::{ByteReader, ByteWriter, DecodeError};
pub use types::{ObjectId, PlayerId, TilePos, Vec3};
