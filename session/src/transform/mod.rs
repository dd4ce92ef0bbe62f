//! Rate-limited, threshold-gated broadcast of entity transforms, with
//! client-side interpolation for remote entities.
//!
//! Samples ride the sequenced best-effort channel: only the newest sample
//! per entity matters, so transport-level drops of superseded samples are
//! harmless.

mod proxy;

pub use proxy::RemoteEntityProxy;

use std::{collections::HashMap, time::Instant};

use log::trace;

use tether_shared::{Message, PlayerId, Timer, TransformSample, Vec3};

use crate::{
    config::TransformConfig,
    error::SessionError,
    session::{Session, SessionState},
    transport::{ChannelKind, PeerId},
};

struct LocalTransform {
    position: Vec3,
    yaw: f32,
    motion_state: Option<u8>,
}

pub struct TransformSync {
    config: TransformConfig,
    sample_timer: Timer,
    local: Option<LocalTransform>,
    /// Position/yaw at the time of the last send, for threshold gating.
    last_sent: Option<(Vec3, f32)>,
    proxies: HashMap<PlayerId, RemoteEntityProxy>,
}

impl TransformSync {
    pub fn new(config: TransformConfig) -> Self {
        let sample_timer = Timer::new(config.sample_interval, Instant::now());
        Self {
            config,
            sample_timer,
            local: None,
            last_sent: None,
            proxies: HashMap::new(),
        }
    }

    /// Records the local tracked entity's current transform. Whether a
    /// sample actually goes out is decided by `tick`.
    pub fn update_local(&mut self, position: Vec3, yaw: f32, motion_state: Option<u8>) {
        self.local = Some(LocalTransform {
            position,
            yaw,
            motion_state,
        });
    }

    /// Sampling plus interpolation. Interpolation runs every tick regardless
    /// of network activity.
    pub fn tick(&mut self, session: &mut Session, now: Instant, dt_secs: f32) {
        self.maybe_send(session, now);
        for proxy in self.proxies.values_mut() {
            proxy.advance(dt_secs, &self.config);
        }
    }

    fn maybe_send(&mut self, session: &mut Session, now: Instant) {
        if !matches!(
            session.state(),
            SessionState::Hosting | SessionState::Connected
        ) {
            return;
        }
        let Some(local) = self.local.as_ref() else {
            return;
        };
        if !self.sample_timer.ringing(now) {
            return;
        }
        let moved = match self.last_sent {
            None => true,
            Some((position, yaw)) => {
                position.distance(&local.position) >= self.config.min_move_distance
                    || angle_delta(yaw, local.yaw).abs() >= self.config.min_turn_degrees
            }
        };
        if !moved {
            return;
        }
        let Some(entity_id) = session.local_player_id() else {
            // still waiting for the host's welcome
            return;
        };

        self.sample_timer.reset(now);
        self.last_sent = Some((local.position, local.yaw));
        let sample = TransformSample {
            entity_id,
            position: local.position,
            yaw: local.yaw,
            motion_state: local.motion_state,
        };
        let message = Message::Transform(sample);
        if session.is_host() {
            session.broadcast_sample(&message, None);
        } else if let Err(error) = session.send_to_host(ChannelKind::Samples, &message) {
            trace!("transform sample dropped: {error}");
        }
    }

    /// Handles a transform sample from the wire.
    pub fn handle_message(&mut self, session: &mut Session, peer: PeerId, sample: TransformSample) {
        if session.is_host() {
            // re-attribute to the sender's registered id rather than
            // trusting the wire, then relay to everyone else
            let Some(player_id) = session.player_id_for(peer) else {
                session.record_error(SessionError::AuthorityViolation {
                    context: "transform sample from a peer that has not joined",
                });
                return;
            };
            let sample = TransformSample {
                entity_id: player_id,
                ..sample
            };
            self.apply_sample(sample);
            session.broadcast_sample(&Message::Transform(sample), Some(peer));
        } else {
            if Some(peer) != session.host_peer() {
                session.record_error(SessionError::AuthorityViolation {
                    context: "transform sample from a non-host peer",
                });
                return;
            }
            if Some(sample.entity_id) == session.local_player_id() {
                // our own sample reflected back; the local entity is not a proxy
                return;
            }
            self.apply_sample(sample);
        }
    }

    /// Updates (or lazily creates) the proxy targeted by a sample.
    fn apply_sample(&mut self, sample: TransformSample) {
        self.proxies
            .entry(sample.entity_id)
            .and_modify(|proxy| proxy.set_target(&sample))
            .or_insert_with(|| RemoteEntityProxy::new(&sample));
    }

    /// Destroys the departed player's proxy immediately.
    pub fn remove_proxy(&mut self, player_id: PlayerId) {
        self.proxies.remove(&player_id);
    }

    /// Drops all proxies and send gating; called on session reset.
    pub fn clear(&mut self) {
        self.proxies.clear();
        self.local = None;
        self.last_sent = None;
    }

    pub fn proxy(&self, player_id: PlayerId) -> Option<&RemoteEntityProxy> {
        self.proxies.get(&player_id)
    }

    pub fn proxies(&self) -> impl Iterator<Item = (&PlayerId, &RemoteEntityProxy)> {
        self.proxies.iter()
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}

/// Smallest signed difference between two degree angles.
fn angle_delta(from: f32, to: f32) -> f32 {
    let mut delta = (to - from) % 360.0;
    if delta >= 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    delta
}
