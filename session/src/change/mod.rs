//! Host-authoritative propagation of discrete object events.
//!
//! Any participant may propose a change; only the host's acceptance makes it
//! real. Clients send proposals to the host and wait for the rebroadcast;
//! they never apply their own proposal directly.

use std::collections::VecDeque;

use log::{trace, warn};

use tether_shared::{ChangeKind, Message, ObjectChangeEvent};

use crate::{
    config::ChangeConfig,
    error::SessionError,
    session::Session,
    transport::{ChannelKind, PeerId},
    world::WorldAdapter,
};

/// One queued proposal and, for client proposals, the peer to exclude from
/// the rebroadcast.
struct QueuedChange {
    proposer: Option<PeerId>,
    event: ObjectChangeEvent,
}

pub struct ChangeSync {
    config: ChangeConfig,
    queue: VecDeque<QueuedChange>,
}

impl ChangeSync {
    pub fn new(config: ChangeConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
        }
    }

    /// Local participant proposes a change. On the host it joins the queue;
    /// on a client it is sent to the host and NOT applied locally.
    pub fn propose(&mut self, session: &mut Session, mut event: ObjectChangeEvent) {
        if session.is_host() {
            event.player_id = tether_shared::HOST_PLAYER_ID;
            self.queue.push_back(QueuedChange {
                proposer: None,
                event,
            });
            return;
        }
        if let Some(player_id) = session.local_player_id() {
            event.player_id = player_id;
        }
        let message = Message::ObjectChange(event);
        if let Err(error) = session.send_to_host(ChannelKind::Control, &message) {
            warn!("failed to send change proposal: {error}");
        }
    }

    /// Handles an object-change message from the wire.
    pub fn handle_message(
        &mut self,
        session: &mut Session,
        world: &mut dyn WorldAdapter,
        peer: PeerId,
        mut event: ObjectChangeEvent,
    ) {
        if session.is_host() {
            // client proposal: re-attribute to the sender's registered id
            // rather than trusting the wire
            let Some(player_id) = session.player_id_for(peer) else {
                session.record_error(SessionError::AuthorityViolation {
                    context: "change proposal from a peer that has not joined",
                });
                return;
            };
            event.player_id = player_id;
            self.queue.push_back(QueuedChange {
                proposer: Some(peer),
                event,
            });
        } else {
            // only the host may make changes canonical
            if Some(peer) != session.host_peer() {
                session.record_error(SessionError::AuthorityViolation {
                    context: "object change from a non-host peer",
                });
                return;
            }
            apply_change(session, world, &event);
        }
    }

    /// Host only: drains up to the batch size, validating, applying, and
    /// rebroadcasting each accepted change. Bounded work per tick keeps
    /// frame times flat under bursts.
    pub fn tick(&mut self, session: &mut Session, world: &mut dyn WorldAdapter) {
        if !session.is_host() {
            return;
        }
        for _ in 0..self.config.batch_size {
            let Some(queued) = self.queue.pop_front() else {
                break;
            };
            if !self.validate_change(&queued.event) {
                trace!(
                    "change {:?} on object {} rejected",
                    queued.event.kind,
                    queued.event.object_id
                );
                continue;
            }
            apply_change(session, world, &queued.event);
            let message = Message::ObjectChange(queued.event);
            session.broadcast_control(&message, queued.proposer);
        }
    }

    /// Validation seam. Accepts everything today; rule checks hook in here.
    fn validate_change(&self, _event: &ObjectChangeEvent) -> bool {
        true
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drops all queued proposals; called on session reset.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Applies one accepted change to the local world through the adapter.
/// Failures are per-event: logged, skipped, never retried, since the
/// authoritative state has already advanced.
fn apply_change(session: &mut Session, world: &mut dyn WorldAdapter, event: &ObjectChangeEvent) {
    let Some(handle) = world.find_entity(event.object_id) else {
        session.record_error(SessionError::EntityNotFound {
            id: event.object_id,
        });
        return;
    };
    let result = match event.kind {
        ChangeKind::PickedUp | ChangeKind::Destroyed => world.set_entity_visible(handle, false),
        ChangeKind::Dropped | ChangeKind::Created => world
            .set_entity_visible(handle, true)
            .and_then(|()| world.set_entity_position(handle, event.tile, event.rotation)),
        ChangeKind::Moved | ChangeKind::StateChanged => world.update_entity(handle, event),
    };
    if let Err(adapter_error) = result {
        session.record_error(SessionError::AdapterFailure(adapter_error));
    }
}
