use crate::serde::{ByteReader, ByteWriter, DecodeError};
use crate::types::{ObjectId, PlayerId, TilePos};

/// What happened to a world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Destroyed,
    Moved,
    StateChanged,
    PickedUp,
    Dropped,
}

impl ChangeKind {
    pub fn to_byte(&self) -> u8 {
        match self {
            ChangeKind::Created => 0,
            ChangeKind::Destroyed => 1,
            ChangeKind::Moved => 2,
            ChangeKind::StateChanged => 3,
            ChangeKind::PickedUp => 4,
            ChangeKind::Dropped => 5,
        }
    }

    pub fn from_byte(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(ChangeKind::Created),
            1 => Ok(ChangeKind::Destroyed),
            2 => Ok(ChangeKind::Moved),
            3 => Ok(ChangeKind::StateChanged),
            4 => Ok(ChangeKind::PickedUp),
            5 => Ok(ChangeKind::Dropped),
            _ => Err(DecodeError::UnknownChangeKind { value }),
        }
    }
}

/// One discrete object event, proposed by any participant and made canonical
/// only by the host's acceptance.
///
/// Events carry no ownership of network buffers: the optional state blob is
/// copied out of the payload on decode.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectChangeEvent {
    pub object_id: ObjectId,
    /// Opaque object-type tag understood by the world adapter.
    pub object_kind: String,
    pub tile: TilePos,
    pub rotation: i32,
    /// The player the change is attributed to.
    pub player_id: PlayerId,
    pub kind: ChangeKind,
    /// Opaque per-object state understood only by the world adapter.
    pub state: Option<Vec<u8>>,
}

impl ObjectChangeEvent {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.object_id);
        writer.write_string(&self.object_kind);
        writer.write_i32(self.tile.x);
        writer.write_i32(self.tile.y);
        writer.write_i32(self.rotation);
        writer.write_i32(self.player_id);
        writer.write_u8(self.kind.to_byte());
        match &self.state {
            Some(state) => writer.write_blob(state),
            None => writer.write_u32(0),
        }
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let object_id = reader.read_i32()?;
        let object_kind = reader.read_string()?;
        let tile = TilePos::new(reader.read_i32()?, reader.read_i32()?);
        let rotation = reader.read_i32()?;
        let player_id = reader.read_i32()?;
        let kind = ChangeKind::from_byte(reader.read_u8()?)?;
        let state_bytes = reader.read_blob()?;
        let state = if state_bytes.is_empty() {
            None
        } else {
            Some(state_bytes)
        };
        Ok(Self {
            object_id,
            object_kind,
            tile,
            rotation,
            player_id,
            kind,
            state,
        })
    }
}
