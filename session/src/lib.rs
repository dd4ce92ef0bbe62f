//! # Tether Session
//! Real-time world-state synchronization between a host and its peers over a
//! point-to-point connection: session/connection management, a chunked
//! checksummed snapshot bootstrap, host-authoritative object-change
//! propagation, and rate-limited transform sync with client-side
//! interpolation.
//!
//! The host is always authoritative; there is no consensus, encryption, or
//! NAT traversal at this layer. The surrounding application supplies a
//! [`WorldAdapter`] and [`IdentityAdapter`] at startup and calls
//! [`WorldSession::tick`] once per simulation tick.

#![deny(trivial_casts, trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use tether_shared::{
        crc32, ByteReader, ByteWriter, ChangeKind, DecodeError, Hello, KeyGenerator, Message,
        MessageType, ObjectChangeEvent, ObjectId, PeerJoined, PeerLeft, Ping, PlayerId, Pong,
        SnapshotAck, SnapshotChunk, SnapshotComplete, SnapshotStart, TilePos, Timer,
        TransformSample, Vec3, Welcome, DEFAULT_PORT, HOST_PLAYER_ID,
    };
}

mod change;
mod config;
mod error;
mod runtime;
mod session;
mod snapshot;
mod status;
mod transform;
pub mod transport;
mod world;

pub use change::ChangeSync;
pub use config::{ChangeConfig, SessionConfig, SnapshotConfig, TransformConfig, WorldSessionConfig};
pub use error::SessionError;
pub use runtime::WorldSession;
pub use session::{
    PeerRecord, PeerRole, PingStore, RoutedEvent, Session, SessionEvent, SessionEvents,
    SessionState,
};
pub use snapshot::{SnapshotEngine, SnapshotReceiveState, SnapshotSendState};
pub use transform::{RemoteEntityProxy, TransformSync};
pub use world::{AdapterError, EntityHandle, IdentityAdapter, WorldAdapter};
