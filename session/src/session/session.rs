use std::{collections::HashMap, fmt, time::Instant};

use log::{trace, warn};

use tether_shared::{
    Hello, KeyGenerator, Message, PeerJoined, PeerLeft, Ping, PlayerId, Pong, Timer, Welcome,
    HOST_PLAYER_ID,
};

use crate::{
    config::SessionConfig,
    error::SessionError,
    transport::{ChannelKind, PeerId, SendError, Transport, TransportEvent, TransportProvider},
    world::IdentityAdapter,
};

use super::{
    events::SessionEvents,
    peer::{PeerRecord, PeerRole},
    ping::PingStore,
};

/// Connection lifecycle of the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Hosting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connecting => "Connecting",
            SessionState::Connected => "Connected",
            SessionState::Hosting => "Hosting",
        };
        write!(f, "{label}")
    }
}

/// What `poll()` hands back to the tick driver for fan-out to the snapshot,
/// change, and transform services. Session-internal traffic (identity
/// exchange, pings, directory announcements) never appears here.
#[derive(Debug, PartialEq)]
pub enum RoutedEvent {
    /// A service-bound message from a connected peer.
    Message { peer: PeerId, message: Message },
    /// Host side: a peer completed identity exchange and may now receive
    /// world traffic.
    ClientReady { peer: PeerId, player_id: PlayerId },
    /// A directly-connected peer dropped; services clear its state.
    PeerDisconnected {
        peer: PeerId,
        player_id: Option<PlayerId>,
    },
    /// Client side: the host announced another player's departure.
    PlayerLeft { player_id: PlayerId },
}

/// Owns the connection, the peer directory, and the local identity. Exactly
/// one exists per process; every other service holds it only by reference
/// during a tick.
pub struct Session {
    config: SessionConfig,
    provider: Box<dyn TransportProvider>,
    transport: Option<Box<dyn Transport>>,
    state: SessionState,
    local_name: String,
    local_player_id: Option<PlayerId>,
    peers: HashMap<PeerId, PeerRecord>,
    /// Client-side directory of players known only through host
    /// announcements (not directly connected).
    remote_players: HashMap<PlayerId, String>,
    player_ids: KeyGenerator,
    pings: HashMap<PeerId, PingStore>,
    heartbeat: Timer,
    events: SessionEvents,
    last_error: Option<SessionError>,
    polling: bool,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        provider: Box<dyn TransportProvider>,
        identity: &dyn IdentityAdapter,
    ) -> Self {
        let heartbeat = Timer::new(config.heartbeat_interval, Instant::now());
        Self {
            config,
            provider,
            transport: None,
            state: SessionState::Disconnected,
            local_name: identity.local_display_name(),
            local_player_id: None,
            peers: HashMap::new(),
            remote_players: HashMap::new(),
            player_ids: KeyGenerator::new(HOST_PLAYER_ID + 1),
            pings: HashMap::new(),
            heartbeat,
            events: SessionEvents::new(),
            last_error: None,
            polling: false,
        }
    }

    // Lifecycle

    /// Binds a listening endpoint and transitions to Hosting. The peer
    /// directory starts empty; any previous session is torn down first.
    pub fn start_host(&mut self, port: u16, now: Instant) -> Result<(), SessionError> {
        self.disconnect();
        match self.provider.bind(port) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.local_player_id = Some(HOST_PLAYER_ID);
                self.player_ids = KeyGenerator::new(HOST_PLAYER_ID + 1);
                self.heartbeat.reset(now);
                self.set_state(SessionState::Hosting);
                Ok(())
            }
            Err(_) => {
                let error = SessionError::BindFailed { port };
                self.record_error(error.clone());
                Err(error)
            }
        }
    }

    /// Starts an outgoing connection and transitions to Connecting.
    /// Completion (Connected or failure) is delivered by `poll()`.
    pub fn connect(&mut self, address: &str, port: u16, now: Instant) -> Result<(), SessionError> {
        self.disconnect();
        match self.provider.connect(address, port) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.heartbeat.reset(now);
                self.set_state(SessionState::Connecting);
                Ok(())
            }
            Err(_) => {
                let error = SessionError::ConnectFailed {
                    address: address.to_string(),
                    port,
                };
                self.record_error(error.clone());
                Err(error)
            }
        }
    }

    /// Tears down all peers and returns to Disconnected. Safe to call in any
    /// state, any number of times.
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.shutdown();
        }
        self.peers.clear();
        self.pings.clear();
        self.remote_players.clear();
        self.local_player_id = None;
        if self.state != SessionState::Disconnected {
            self.set_state(SessionState::Disconnected);
        }
    }

    // Tick

    /// Drains every pending transport event. Must run once per simulation
    /// tick; never blocks. Session traffic is handled internally; messages
    /// belonging to the snapshot/change/transform services come back to the
    /// caller for routing.
    pub fn poll(&mut self, now: Instant) -> Vec<RoutedEvent> {
        // a handler triggering another poll would re-enter the peer
        // directory mid-update
        if self.polling {
            warn!("poll() re-entered from within a handler; ignoring");
            return Vec::new();
        }
        self.polling = true;

        let mut routed = Vec::new();
        self.send_heartbeats(now);
        loop {
            let event = match self.transport.as_mut() {
                Some(transport) => transport.poll_event(),
                None => None,
            };
            let Some(event) = event else { break };
            self.handle_transport_event(event, now, &mut routed);
        }

        self.polling = false;
        routed
    }

    fn send_heartbeats(&mut self, now: Instant) {
        if self.transport.is_none() || !self.heartbeat.ringing(now) {
            return;
        }
        self.heartbeat.reset(now);
        let peer_ids: Vec<PeerId> = self.peers.keys().copied().collect();
        for peer in peer_ids {
            let index = self.pings.entry(peer).or_default().push(now);
            if let Err(error) = self.send_control(peer, &Message::Ping(Ping { index })) {
                warn!("heartbeat to {peer} failed: {error}");
            }
        }
    }

    fn handle_transport_event(
        &mut self,
        event: TransportEvent,
        now: Instant,
        routed: &mut Vec<RoutedEvent>,
    ) {
        match event {
            TransportEvent::PeerConnected(peer) => self.on_peer_connected(peer, now),
            TransportEvent::PeerDisconnected(peer) => self.on_peer_disconnected(peer, routed),
            TransportEvent::Message { peer, payload, .. } => {
                if let Some(record) = self.peers.get_mut(&peer) {
                    record.last_seen = now;
                }
                match Message::decode(&payload) {
                    Ok(message) => self.on_message(peer, message, now, routed),
                    Err(decode_error) => {
                        self.record_error(SessionError::MalformedMessage(decode_error));
                    }
                }
            }
        }
    }

    fn on_peer_connected(&mut self, peer: PeerId, now: Instant) {
        match self.state {
            SessionState::Hosting => {
                trace!("{peer} connected; awaiting hello");
                self.peers
                    .insert(peer, PeerRecord::new(peer, PeerRole::Client, now));
            }
            SessionState::Connecting => {
                let mut record = PeerRecord::new(peer, PeerRole::Host, now);
                record.player_id = Some(HOST_PLAYER_ID);
                self.peers.insert(peer, record);
                self.set_state(SessionState::Connected);
                let hello = Message::Hello(Hello {
                    display_name: self.local_name.clone(),
                });
                if let Err(error) = self.send_control(peer, &hello) {
                    warn!("failed to send hello: {error}");
                }
            }
            _ => {
                warn!("unexpected peer {peer} connected while {}", self.state);
            }
        }
    }

    fn on_peer_disconnected(&mut self, peer: PeerId, routed: &mut Vec<RoutedEvent>) {
        let Some(record) = self.peers.remove(&peer) else {
            return;
        };
        self.pings.remove(&peer);
        routed.push(RoutedEvent::PeerDisconnected {
            peer,
            player_id: record.player_id,
        });

        match record.role {
            PeerRole::Client => {
                if let Some(player_id) = record.player_id {
                    self.player_ids.recycle(player_id);
                    self.events
                        .push_player_disconnected(player_id, record.display_name);
                    self.broadcast_control(&Message::PeerLeft(PeerLeft { player_id }), None);
                }
            }
            PeerRole::Host => {
                // losing the host ends the session
                self.disconnect();
            }
        }
    }

    fn on_message(
        &mut self,
        peer: PeerId,
        message: Message,
        now: Instant,
        routed: &mut Vec<RoutedEvent>,
    ) {
        match message {
            Message::Hello(hello) => self.on_hello(peer, hello, routed),
            Message::Welcome(welcome) => self.on_welcome(peer, welcome),
            Message::Ping(ping) => {
                let pong = Message::Pong(Pong { index: ping.index });
                if let Err(error) = self.send_control(peer, &pong) {
                    warn!("failed to answer ping from {peer}: {error}");
                }
            }
            Message::Pong(pong) => self.on_pong(peer, pong.index, now),
            Message::PeerJoined(joined) => {
                if self.is_host() {
                    self.record_error(SessionError::AuthorityViolation {
                        context: "host received a peer-joined announcement",
                    });
                    return;
                }
                self.remote_players
                    .insert(joined.player_id, joined.display_name.clone());
                self.events
                    .push_player_connected(joined.player_id, joined.display_name);
            }
            Message::PeerLeft(left) => {
                if self.is_host() {
                    self.record_error(SessionError::AuthorityViolation {
                        context: "host received a peer-left announcement",
                    });
                    return;
                }
                let display_name = self.remote_players.remove(&left.player_id);
                self.events
                    .push_player_disconnected(left.player_id, display_name);
                routed.push(RoutedEvent::PlayerLeft {
                    player_id: left.player_id,
                });
            }
            // Snapshot, object-change, and transform traffic belongs to the
            // services; hand it back for routing.
            other => routed.push(RoutedEvent::Message {
                peer,
                message: other,
            }),
        }
    }

    fn on_hello(&mut self, peer: PeerId, hello: Hello, routed: &mut Vec<RoutedEvent>) {
        if !self.is_host() {
            self.record_error(SessionError::AuthorityViolation {
                context: "only the host assigns player ids",
            });
            return;
        }
        let Some(record) = self.peers.get_mut(&peer) else {
            warn!("hello from unknown {peer}");
            return;
        };
        if record.player_id.is_some() {
            warn!("duplicate hello from {peer}");
            return;
        }

        let player_id = self.player_ids.generate();
        record.player_id = Some(player_id);
        record.display_name = Some(hello.display_name.clone());

        let welcome = Message::Welcome(Welcome {
            player_id,
            host_name: self.local_name.clone(),
        });
        if let Err(error) = self.send_control(peer, &welcome) {
            warn!("failed to welcome {peer}: {error}");
            return;
        }

        // introduce the newcomer and the existing players to each other
        let announcement = Message::PeerJoined(PeerJoined {
            player_id,
            display_name: hello.display_name.clone(),
        });
        self.broadcast_control(&announcement, Some(peer));
        let existing: Vec<PeerJoined> = self
            .peers
            .values()
            .filter(|other| other.peer != peer)
            .filter_map(|other| {
                Some(PeerJoined {
                    player_id: other.player_id?,
                    display_name: other.display_name.clone().unwrap_or_default(),
                })
            })
            .collect();
        for joined in existing {
            if let Err(error) = self.send_control(peer, &Message::PeerJoined(joined)) {
                warn!("failed to announce roster to {peer}: {error}");
            }
        }

        self.events
            .push_player_connected(player_id, hello.display_name);
        routed.push(RoutedEvent::ClientReady { peer, player_id });
    }

    fn on_welcome(&mut self, peer: PeerId, welcome: Welcome) {
        if self.state != SessionState::Connected {
            self.record_error(SessionError::AuthorityViolation {
                context: "welcome received outside a client session",
            });
            return;
        }
        self.local_player_id = Some(welcome.player_id);
        if let Some(record) = self.peers.get_mut(&peer) {
            record.display_name = Some(welcome.host_name.clone());
        }
        self.events
            .push_player_connected(HOST_PLAYER_ID, welcome.host_name);
    }

    fn on_pong(&mut self, peer: PeerId, index: u16, now: Instant) {
        let Some(sent_at) = self.pings.get_mut(&peer).and_then(|store| store.resolve(index))
        else {
            trace!("stale pong {index} from {peer}");
            return;
        };
        let rtt_millis = now.saturating_duration_since(sent_at).as_secs_f32() * 1000.0;
        if let Some(record) = self.peers.get_mut(&peer) {
            record.record_rtt(rtt_millis, self.config.rtt_smoothing);
        }
    }

    // Sending

    pub fn send_control(&mut self, peer: PeerId, message: &Message) -> Result<(), SessionError> {
        self.send_on(peer, ChannelKind::Control, message)
    }

    pub fn send_sample(&mut self, peer: PeerId, message: &Message) -> Result<(), SessionError> {
        self.send_on(peer, ChannelKind::Samples, message)
    }

    fn send_on(
        &mut self,
        peer: PeerId,
        channel: ChannelKind,
        message: &Message,
    ) -> Result<(), SessionError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(SessionError::Transport(SendError { peer }));
        };
        transport.send(peer, channel, &message.encode())?;
        Ok(())
    }

    /// Sends to every peer that completed identity exchange, optionally
    /// skipping one (the proposer of a rebroadcast change already knows).
    pub fn broadcast_control(&mut self, message: &Message, except: Option<PeerId>) {
        self.broadcast_on(ChannelKind::Control, message, except);
    }

    pub fn broadcast_sample(&mut self, message: &Message, except: Option<PeerId>) {
        self.broadcast_on(ChannelKind::Samples, message, except);
    }

    fn broadcast_on(&mut self, channel: ChannelKind, message: &Message, except: Option<PeerId>) {
        let targets: Vec<PeerId> = self
            .peers
            .values()
            .filter(|record| record.player_id.is_some())
            .map(|record| record.peer)
            .filter(|peer| Some(*peer) != except)
            .collect();
        let payload = message.encode();
        if let Some(transport) = self.transport.as_mut() {
            for peer in targets {
                if let Err(error) = transport.send(peer, channel, &payload) {
                    warn!("broadcast to {peer} failed: {error}");
                }
            }
        }
    }

    /// Client-side: sends to the host on the given channel.
    pub fn send_to_host(
        &mut self,
        channel: ChannelKind,
        message: &Message,
    ) -> Result<(), SessionError> {
        let Some(host) = self.host_peer() else {
            return Err(SessionError::AuthorityViolation {
                context: "no host connection",
            });
        };
        self.send_on(host, channel, message)
    }

    // Accessors

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_host(&self) -> bool {
        self.state == SessionState::Hosting
    }

    pub fn local_player_id(&self) -> Option<PlayerId> {
        self.local_player_id
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn host_peer(&self) -> Option<PeerId> {
        self.peers
            .values()
            .find(|record| record.role == PeerRole::Host)
            .map(|record| record.peer)
    }

    pub fn peer(&self, peer: PeerId) -> Option<&PeerRecord> {
        self.peers.get(&peer)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerRecord> {
        self.peers.values()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// The player id registered for a directly-connected peer.
    pub fn player_id_for(&self, peer: PeerId) -> Option<PlayerId> {
        self.peers.get(&peer).and_then(|record| record.player_id)
    }

    /// Display name of a player known through host announcements.
    pub fn remote_player_name(&self, player_id: PlayerId) -> Option<&str> {
        self.remote_players.get(&player_id).map(String::as_str)
    }

    pub fn events(&mut self) -> &mut SessionEvents {
        &mut self.events
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    // Internal

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.events.push_state_changed(state);
    }

    pub(crate) fn record_error(&mut self, error: SessionError) {
        warn!("{error}");
        self.last_error = Some(error.clone());
        self.events.push_error(error);
    }
}
