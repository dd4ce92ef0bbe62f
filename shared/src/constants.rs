use std::time::Duration;

/// Well-known listening/connect port.
pub const DEFAULT_PORT: u16 = 9050;

/// The player id permanently reserved for the host.
pub const HOST_PLAYER_ID: i32 = 0;

/// Interval between keep-alive pings in either direction.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(2);

/// Size of one snapshot chunk. Chosen to stay safely under the single-message
/// ceiling of every transport we target.
pub const SNAPSHOT_CHUNK_BYTES: usize = 8 * 1024;

/// Upper bound on snapshot chunks written per tick, so a large transfer
/// never monopolizes a frame.
pub const SNAPSHOT_CHUNKS_PER_TICK: usize = 8;

/// Upper bound on object-change events the host drains per tick.
pub const CHANGE_BATCH_SIZE: usize = 16;

/// Minimum spacing between outgoing transform samples.
pub const TRANSFORM_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// A transform sample is only sent once the tracked entity has moved at
/// least this far since the last send.
pub const MIN_MOVE_DISTANCE: f32 = 0.05;

/// ... or turned at least this many degrees.
pub const MIN_TURN_DEGREES: f32 = 1.0;

/// A remote proxy further than this from its target snaps instead of
/// interpolating.
pub const TELEPORT_DISTANCE: f32 = 10.0;

/// Exponential approach rate for proxy positions, per second.
pub const POSITION_SMOOTHING_RATE: f32 = 12.0;

/// Angular speed cap for proxy rotation, degrees per second.
pub const MAX_TURN_RATE_DEGREES: f32 = 540.0;
