use crate::serde::{ByteReader, ByteWriter, DecodeError};

use super::{
    message_type::MessageType,
    object_change::ObjectChangeEvent,
    session::{Hello, PeerJoined, PeerLeft, Ping, Pong, Welcome},
    snapshot::{SnapshotAck, SnapshotChunk, SnapshotComplete, SnapshotStart},
    transform::TransformSample,
};

/// One fully-typed wire message. Produced by a sender, consumed once by a
/// receiver; a payload that fails to decode is dropped whole.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Hello(Hello),
    Welcome(Welcome),
    Ping(Ping),
    Pong(Pong),
    PeerJoined(PeerJoined),
    PeerLeft(PeerLeft),
    SnapshotStart(SnapshotStart),
    SnapshotChunk(SnapshotChunk),
    SnapshotComplete(SnapshotComplete),
    SnapshotAck(SnapshotAck),
    ObjectChange(ObjectChangeEvent),
    Transform(TransformSample),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Hello(_) => MessageType::Hello,
            Message::Welcome(_) => MessageType::Welcome,
            Message::Ping(_) => MessageType::Ping,
            Message::Pong(_) => MessageType::Pong,
            Message::PeerJoined(_) => MessageType::PeerJoined,
            Message::PeerLeft(_) => MessageType::PeerLeft,
            Message::SnapshotStart(_) => MessageType::SnapshotStart,
            Message::SnapshotChunk(_) => MessageType::SnapshotChunk,
            Message::SnapshotComplete(_) => MessageType::SnapshotComplete,
            Message::SnapshotAck(_) => MessageType::SnapshotAck,
            Message::ObjectChange(_) => MessageType::ObjectChange,
            Message::Transform(_) => MessageType::Transform,
        }
    }

    /// Serializes the tag byte followed by the type-specific fields.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_u8(self.message_type().tag());
        match self {
            Message::Hello(m) => m.ser(&mut writer),
            Message::Welcome(m) => m.ser(&mut writer),
            Message::Ping(m) => m.ser(&mut writer),
            Message::Pong(m) => m.ser(&mut writer),
            Message::PeerJoined(m) => m.ser(&mut writer),
            Message::PeerLeft(m) => m.ser(&mut writer),
            Message::SnapshotStart(m) => m.ser(&mut writer),
            Message::SnapshotChunk(m) => m.ser(&mut writer),
            Message::SnapshotComplete(m) => m.ser(&mut writer),
            Message::SnapshotAck(m) => m.ser(&mut writer),
            Message::ObjectChange(m) => m.ser(&mut writer),
            Message::Transform(m) => m.ser(&mut writer),
        }
        writer.to_bytes()
    }

    /// Dispatches on the leading tag byte and decodes the remainder.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        let mut reader = ByteReader::new(payload);
        let message_type = MessageType::from_tag(reader.read_u8()?)?;
        match message_type {
            MessageType::Hello => Ok(Message::Hello(Hello::de(&mut reader)?)),
            MessageType::Welcome => Ok(Message::Welcome(Welcome::de(&mut reader)?)),
            MessageType::Ping => Ok(Message::Ping(Ping::de(&mut reader)?)),
            MessageType::Pong => Ok(Message::Pong(Pong::de(&mut reader)?)),
            MessageType::PeerJoined => Ok(Message::PeerJoined(PeerJoined::de(&mut reader)?)),
            MessageType::PeerLeft => Ok(Message::PeerLeft(PeerLeft::de(&mut reader)?)),
            MessageType::SnapshotStart => {
                Ok(Message::SnapshotStart(SnapshotStart::de(&mut reader)?))
            }
            MessageType::SnapshotChunk => {
                Ok(Message::SnapshotChunk(SnapshotChunk::de(&mut reader)?))
            }
            MessageType::SnapshotComplete => {
                Ok(Message::SnapshotComplete(SnapshotComplete::de(&mut reader)?))
            }
            MessageType::SnapshotAck => Ok(Message::SnapshotAck(SnapshotAck::de(&mut reader)?)),
            MessageType::ObjectChange => {
                Ok(Message::ObjectChange(ObjectChangeEvent::de(&mut reader)?))
            }
            MessageType::Transform => Ok(Message::Transform(TransformSample::de(&mut reader)?)),
        }
    }
}
