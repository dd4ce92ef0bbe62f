use crate::serde::DecodeError;

/// The one-byte tag that leads every message on the wire. Gaps between the
/// groups leave room for new session/snapshot messages without renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    // Session traffic
    Hello,
    Welcome,
    Ping,
    Pong,
    PeerJoined,
    PeerLeft,
    // Snapshot bootstrap transfer
    SnapshotStart,
    SnapshotChunk,
    SnapshotComplete,
    SnapshotAck,
    // Incremental synchronization
    ObjectChange,
    Transform,
}

impl MessageType {
    pub fn tag(&self) -> u8 {
        match self {
            MessageType::Hello => 1,
            MessageType::Welcome => 2,
            MessageType::Ping => 3,
            MessageType::Pong => 4,
            MessageType::PeerJoined => 5,
            MessageType::PeerLeft => 6,
            MessageType::SnapshotStart => 10,
            MessageType::SnapshotChunk => 11,
            MessageType::SnapshotComplete => 12,
            MessageType::SnapshotAck => 13,
            MessageType::ObjectChange => 20,
            MessageType::Transform => 30,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            1 => Ok(MessageType::Hello),
            2 => Ok(MessageType::Welcome),
            3 => Ok(MessageType::Ping),
            4 => Ok(MessageType::Pong),
            5 => Ok(MessageType::PeerJoined),
            6 => Ok(MessageType::PeerLeft),
            10 => Ok(MessageType::SnapshotStart),
            11 => Ok(MessageType::SnapshotChunk),
            12 => Ok(MessageType::SnapshotComplete),
            13 => Ok(MessageType::SnapshotAck),
            20 => Ok(MessageType::ObjectChange),
            30 => Ok(MessageType::Transform),
            _ => Err(DecodeError::UnknownMessageType { tag }),
        }
    }
}
