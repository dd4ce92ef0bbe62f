//! Session-layer messages: identity exchange, keep-alive pings, and peer
//! directory announcements.

use crate::serde::{ByteReader, ByteWriter, DecodeError};
use crate::types::PlayerId;

/// First message a client sends after the transport connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    pub display_name: String,
}

impl Hello {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_string(&self.display_name);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            display_name: reader.read_string()?,
        })
    }
}

/// Host's reply to a [`Hello`], carrying the id it assigned to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welcome {
    pub player_id: PlayerId,
    pub host_name: String,
}

impl Welcome {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.player_id);
        writer.write_string(&self.host_name);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            player_id: reader.read_i32()?,
            host_name: reader.read_string()?,
        })
    }
}

/// Keep-alive probe; must be answered with a [`Pong`] echoing the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub index: u16,
}

impl Ping {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.index);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            index: reader.read_u16()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    pub index: u16,
}

impl Pong {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(self.index);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            index: reader.read_u16()?,
        })
    }
}

/// Host announcement that a player joined the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerJoined {
    pub player_id: PlayerId,
    pub display_name: String,
}

impl PeerJoined {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.player_id);
        writer.write_string(&self.display_name);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            player_id: reader.read_i32()?,
            display_name: reader.read_string()?,
        })
    }
}

/// Host announcement that a player left. Receivers drop that player's
/// remote entity proxy immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerLeft {
    pub player_id: PlayerId,
}

impl PeerLeft {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.player_id);
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        Ok(Self {
            player_id: reader.read_i32()?,
        })
    }
}
