use thiserror::Error;

use tether_shared::{DecodeError, ObjectId};

use crate::transport::SendError;
use crate::world::AdapterError;

/// Everything that can go wrong inside the synchronization subsystem.
///
/// Protocol- and adapter-level variants are recoverable: the offending
/// message or event is logged and dropped, and the session continues.
/// Transport-level variants are terminal for the current session and force a
/// reset to Disconnected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The listening port could not be bound
    #[error("Failed to bind listening port {port}")]
    BindFailed { port: u16 },

    /// The outgoing connection could not be established
    #[error("Failed to connect to {address}:{port}")]
    ConnectFailed { address: String, port: u16 },

    /// A received payload could not be decoded; the message was dropped
    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] DecodeError),

    /// The world adapter had no state blob to snapshot
    #[error("World state is unavailable for snapshot")]
    SnapshotUnavailable,

    /// The reassembled snapshot did not match the sender's checksum
    #[error("Snapshot integrity mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    IntegrityMismatch { expected: u32, computed: u32 },

    /// A message arrived at a participant that has no authority to process it
    #[error("Authority violation: {context}")]
    AuthorityViolation { context: &'static str },

    /// The world adapter could not find the change's target entity
    #[error("Entity {id} not found in the local world")]
    EntityNotFound { id: ObjectId },

    /// A world adapter call failed; the operation was skipped
    #[error("World adapter failure: {0}")]
    AdapterFailure(#[from] AdapterError),

    /// The transport refused an outgoing payload
    #[error("Transport send failure: {0}")]
    Transport(#[from] SendError),
}
