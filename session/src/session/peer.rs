use std::time::Instant;

use tether_shared::PlayerId;

use crate::transport::PeerId;

/// Which side of the session a peer record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Host,
    Client,
}

/// Directory entry for one directly-connected peer.
///
/// Owned by the session layer; the other services only read it. Removed the
/// moment the transport reports the peer gone.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub peer: PeerId,
    pub role: PeerRole,
    /// Assigned by the host once identity exchange completes; `None` for a
    /// client that has connected but not yet said hello.
    pub player_id: Option<PlayerId>,
    pub display_name: Option<String>,
    /// Smoothed round-trip time, `None` until the first pong arrives.
    pub rtt_millis: Option<f32>,
    pub last_seen: Instant,
}

impl PeerRecord {
    pub fn new(peer: PeerId, role: PeerRole, now: Instant) -> Self {
        Self {
            peer,
            role,
            player_id: None,
            display_name: None,
            rtt_millis: None,
            last_seen: now,
        }
    }

    pub fn record_rtt(&mut self, sample_millis: f32, smoothing: f32) {
        self.rtt_millis = Some(match self.rtt_millis {
            None => sample_millis,
            Some(current) => current + (sample_millis - current) * smoothing,
        });
    }
}
