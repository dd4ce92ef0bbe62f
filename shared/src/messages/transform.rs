use crate::serde::{ByteReader, ByteWriter, DecodeError};
use crate::types::{PlayerId, Vec3};

/// Latest position/orientation of one tracked entity.
///
/// Sent on the sequenced best-effort channel; only the newest sample per
/// entity matters, so dropped or superseded samples are harmless. The
/// motion-state byte is an optional trailing field: absent on the wire when
/// the sender has nothing to report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSample {
    pub entity_id: PlayerId,
    pub position: Vec3,
    pub yaw: f32,
    pub motion_state: Option<u8>,
}

impl TransformSample {
    pub fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.entity_id);
        writer.write_f32(self.position.x);
        writer.write_f32(self.position.y);
        writer.write_f32(self.position.z);
        writer.write_f32(self.yaw);
        if let Some(state) = self.motion_state {
            writer.write_u8(state);
        }
    }

    pub fn de(reader: &mut ByteReader) -> Result<Self, DecodeError> {
        let entity_id = reader.read_i32()?;
        let position = Vec3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?);
        let yaw = reader.read_f32()?;
        let motion_state = if reader.is_empty() {
            None
        } else {
            Some(reader.read_u8()?)
        };
        Ok(Self {
            entity_id,
            position,
            yaw,
            motion_state,
        })
    }
}
