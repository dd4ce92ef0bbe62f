mod message;
mod message_type;
mod object_change;
mod session;
mod snapshot;
mod transform;

pub use message::Message;
pub use message_type::MessageType;
pub use object_change::{ChangeKind, ObjectChangeEvent};
pub use session::{Hello, PeerJoined, PeerLeft, Ping, Pong, Welcome};
pub use snapshot::{SnapshotAck, SnapshotChunk, SnapshotComplete, SnapshotStart};
pub use transform::TransformSample;
