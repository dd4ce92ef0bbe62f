//! The tick driver.
//!
//! [`WorldSession`] bundles the session layer and the three synchronization
//! services into the one object the surrounding application constructs at
//! startup and ticks once per simulation frame. All network handling runs to
//! completion synchronously inside `tick`; nothing here blocks or suspends.

use std::time::Instant;

use log::warn;

use tether_shared::{Message, ObjectChangeEvent, PlayerId, Vec3};

use crate::{
    change::ChangeSync,
    config::WorldSessionConfig,
    error::SessionError,
    session::{RoutedEvent, Session, SessionEvents, SessionState},
    snapshot::SnapshotEngine,
    status::build_status,
    transform::{RemoteEntityProxy, TransformSync},
    transport::{PeerId, TransportProvider},
    world::{IdentityAdapter, WorldAdapter},
};

pub struct WorldSession {
    session: Session,
    snapshot: SnapshotEngine,
    changes: ChangeSync,
    transforms: TransformSync,
    status: String,
    last_tick: Option<Instant>,
}

impl WorldSession {
    pub fn new(
        config: WorldSessionConfig,
        provider: Box<dyn TransportProvider>,
        identity: &dyn IdentityAdapter,
    ) -> Self {
        Self {
            session: Session::new(config.session, provider, identity),
            snapshot: SnapshotEngine::new(config.snapshot),
            changes: ChangeSync::new(config.change),
            transforms: TransformSync::new(config.transform),
            status: SessionState::Disconnected.to_string(),
            last_tick: None,
        }
    }

    // Lifecycle

    pub fn start_host(&mut self, port: u16) -> Result<(), SessionError> {
        self.clear_services();
        self.session.start_host(port, Instant::now())
    }

    pub fn connect(&mut self, address: &str, port: u16) -> Result<(), SessionError> {
        self.clear_services();
        self.session.connect(address, port, Instant::now())
    }

    /// Synchronous cancel of everything in flight. Idempotent.
    pub fn disconnect(&mut self) {
        self.session.disconnect();
        self.clear_services();
    }

    fn clear_services(&mut self) {
        self.snapshot.clear();
        self.changes.clear();
        self.transforms.clear();
    }

    // Tick

    /// Runs one synchronization step: drains the transport, routes service
    /// traffic, advances the snapshot/change/transform services, and
    /// refreshes the status line. Call once per simulation tick.
    pub fn tick(&mut self, now: Instant, world: &mut dyn WorldAdapter) {
        let dt_secs = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        for event in self.session.poll(now) {
            self.route(event, world);
        }
        // a mid-poll host loss resets the session; drop anything the
        // services still hold for it
        if self.session.state() == SessionState::Disconnected {
            self.clear_services();
        }

        self.snapshot.tick(&mut self.session);
        self.changes.tick(&mut self.session, world);
        self.transforms.tick(&mut self.session, now, dt_secs);

        self.status = build_status(&self.session, &self.snapshot);
    }

    fn route(&mut self, event: RoutedEvent, world: &mut dyn WorldAdapter) {
        match event {
            RoutedEvent::Message { peer, message } => match message {
                Message::SnapshotStart(_)
                | Message::SnapshotChunk(_)
                | Message::SnapshotComplete(_)
                | Message::SnapshotAck(_) => {
                    self.snapshot
                        .handle_message(&mut self.session, world, peer, message);
                }
                Message::ObjectChange(event) => {
                    self.changes
                        .handle_message(&mut self.session, world, peer, event);
                }
                Message::Transform(sample) => {
                    self.transforms.handle_message(&mut self.session, peer, sample);
                }
                other => {
                    warn!("unroutable message {:?}", other.message_type());
                }
            },
            RoutedEvent::ClientReady { peer, .. } => {
                if self.snapshot.auto_snapshot() {
                    let label = self.snapshot.default_label().to_string();
                    self.snapshot
                        .begin_send(&mut self.session, world, peer, &label);
                }
            }
            RoutedEvent::PeerDisconnected { peer, player_id } => {
                self.snapshot.handle_disconnect(&self.session, peer);
                if let Some(player_id) = player_id {
                    self.transforms.remove_proxy(player_id);
                }
            }
            RoutedEvent::PlayerLeft { player_id } => {
                self.transforms.remove_proxy(player_id);
            }
        }
    }

    // Operations

    /// Explicitly starts a snapshot transfer to one peer (the automatic
    /// transfer on join covers the usual case).
    pub fn send_snapshot_to(&mut self, peer: PeerId, world: &mut dyn WorldAdapter) {
        let label = self.snapshot.default_label().to_string();
        self.snapshot
            .begin_send(&mut self.session, world, peer, &label);
    }

    /// Proposes a discrete object change. On a client this goes to the host
    /// and is NOT applied locally until the host's rebroadcast returns.
    pub fn propose_change(&mut self, event: ObjectChangeEvent) {
        self.changes.propose(&mut self.session, event);
    }

    /// Feeds the local tracked entity's transform into the sampler.
    pub fn update_local_transform(&mut self, position: Vec3, yaw: f32, motion_state: Option<u8>) {
        self.transforms.update_local(position, yaw, motion_state);
    }

    // Accessors

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn events(&mut self) -> &mut SessionEvents {
        self.session.events()
    }

    pub fn transforms(&self) -> &TransformSync {
        &self.transforms
    }

    /// Remote entity proxies keyed by player id.
    pub fn remote_proxies(&self) -> impl Iterator<Item = (&PlayerId, &RemoteEntityProxy)> {
        self.transforms.proxies()
    }

    pub fn snapshot(&self) -> &SnapshotEngine {
        &self.snapshot
    }

    pub fn changes(&self) -> &ChangeSync {
        &self.changes
    }

    /// Local player id, `None` until the host's welcome arrives (always set
    /// while hosting).
    pub fn local_player_id(&self) -> Option<PlayerId> {
        self.session.local_player_id()
    }

    /// The status line refreshed by the last `tick`.
    pub fn status(&self) -> &str {
        &self.status
    }
}
