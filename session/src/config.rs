//! Start-time configuration. Nothing here is runtime-reloadable.

use std::time::Duration;

use tether_shared::{
    CHANGE_BATCH_SIZE, HEARTBEAT_INTERVAL, MAX_TURN_RATE_DEGREES, MIN_MOVE_DISTANCE,
    MIN_TURN_DEGREES, POSITION_SMOOTHING_RATE, SNAPSHOT_CHUNKS_PER_TICK, SNAPSHOT_CHUNK_BYTES,
    TELEPORT_DISTANCE, TRANSFORM_SAMPLE_INTERVAL,
};

/// Session-layer knobs.
#[derive(Clone)]
pub struct SessionConfig {
    /// Interval between keep-alive pings in either direction.
    pub heartbeat_interval: Duration,
    /// Smoothing factor applied to new RTT measurements (0 = ignore new
    /// samples, 1 = latest sample only).
    pub rtt_smoothing: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: HEARTBEAT_INTERVAL,
            rtt_smoothing: 0.1,
        }
    }
}

/// Snapshot transfer knobs.
#[derive(Clone)]
pub struct SnapshotConfig {
    /// Size of one chunk. Must stay under the transport's payload ceiling
    /// with room for the chunk header.
    pub chunk_bytes: usize,
    /// Chunks written per sending peer per tick.
    pub chunks_per_tick: usize,
    /// Whether the host starts a transfer to every newly welcomed peer.
    pub auto_snapshot: bool,
    /// Label attached to outgoing transfers, shown in receiver progress.
    pub default_label: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: SNAPSHOT_CHUNK_BYTES,
            chunks_per_tick: SNAPSHOT_CHUNKS_PER_TICK,
            auto_snapshot: true,
            default_label: "world".to_string(),
        }
    }
}

/// Change synchronization knobs.
#[derive(Clone)]
pub struct ChangeConfig {
    /// Queued events the host applies and rebroadcasts per tick.
    pub batch_size: usize,
}

impl Default for ChangeConfig {
    fn default() -> Self {
        Self {
            batch_size: CHANGE_BATCH_SIZE,
        }
    }
}

/// Transform synchronization knobs.
#[derive(Clone)]
pub struct TransformConfig {
    pub sample_interval: Duration,
    pub min_move_distance: f32,
    pub min_turn_degrees: f32,
    pub teleport_distance: f32,
    /// Exponential approach rate for proxy positions, per second.
    pub position_smoothing_rate: f32,
    /// Angular speed cap for proxy rotation, degrees per second.
    pub max_turn_rate_degrees: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            sample_interval: TRANSFORM_SAMPLE_INTERVAL,
            min_move_distance: MIN_MOVE_DISTANCE,
            min_turn_degrees: MIN_TURN_DEGREES,
            teleport_distance: TELEPORT_DISTANCE,
            position_smoothing_rate: POSITION_SMOOTHING_RATE,
            max_turn_rate_degrees: MAX_TURN_RATE_DEGREES,
        }
    }
}

/// Everything the tick driver needs at construction time.
#[derive(Clone, Default)]
pub struct WorldSessionConfig {
    pub session: SessionConfig,
    pub snapshot: SnapshotConfig,
    pub change: ChangeConfig,
    pub transform: TransformConfig,
}
