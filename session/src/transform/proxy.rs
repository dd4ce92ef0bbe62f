use tether_shared::{TransformSample, Vec3};

use crate::config::TransformConfig;

/// Wraps a degree angle into [-180, 180).
fn wrap_degrees(mut degrees: f32) -> f32 {
    degrees %= 360.0;
    if degrees >= 180.0 {
        degrees -= 360.0;
    } else if degrees < -180.0 {
        degrees += 360.0;
    }
    degrees
}

/// Client-side visual stand-in for a remote participant's entity.
///
/// Holds the displayed transform and the latest network target, and advances
/// toward the target every tick. The sample is never applied directly as the
/// visible position, except across the teleport threshold where smoothing
/// a desync would look worse than a snap.
pub struct RemoteEntityProxy {
    current_position: Vec3,
    current_yaw: f32,
    target_position: Vec3,
    target_yaw: f32,
    motion_state: Option<u8>,
}

impl RemoteEntityProxy {
    /// First sample for a previously-unseen entity: appear in place.
    pub fn new(sample: &TransformSample) -> Self {
        Self {
            current_position: sample.position,
            current_yaw: wrap_degrees(sample.yaw),
            target_position: sample.position,
            target_yaw: wrap_degrees(sample.yaw),
            motion_state: sample.motion_state,
        }
    }

    pub fn set_target(&mut self, sample: &TransformSample) {
        self.target_position = sample.position;
        self.target_yaw = wrap_degrees(sample.yaw);
        self.motion_state = sample.motion_state;
    }

    /// One interpolation step. Runs every tick regardless of network
    /// activity.
    pub fn advance(&mut self, dt_secs: f32, config: &TransformConfig) {
        if self.current_position.distance(&self.target_position) > config.teleport_distance {
            self.current_position = self.target_position;
            self.current_yaw = self.target_yaw;
            return;
        }

        let approach = 1.0 - (-config.position_smoothing_rate * dt_secs).exp();
        self.current_position = self.current_position.lerp(&self.target_position, approach);

        let max_step = config.max_turn_rate_degrees * dt_secs;
        let delta = wrap_degrees(self.target_yaw - self.current_yaw).clamp(-max_step, max_step);
        self.current_yaw = wrap_degrees(self.current_yaw + delta);
    }

    pub fn position(&self) -> Vec3 {
        self.current_position
    }

    pub fn yaw(&self) -> f32 {
        self.current_yaw
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn motion_state(&self) -> Option<u8> {
        self.motion_state
    }
}
