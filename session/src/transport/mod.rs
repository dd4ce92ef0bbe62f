//! Transport abstraction.
//!
//! The session layer drives a [`Transport`] through non-blocking polls and
//! never owns a socket directly. Two logical channels are assumed:
//! [`ChannelKind::Control`] must be ordered-reliable (session, snapshot, and
//! object-change traffic), while [`ChannelKind::Samples`] is sequenced
//! best-effort: the transport may silently drop a sample that has been
//! superseded by a newer one for the same entity.

pub mod memory;

use std::fmt;

/// Transport-level identifier for one connected peer. Unique while that peer
/// is connected; may be reused afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Which delivery guarantees a payload needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Ordered-reliable. Control, bootstrap, and object-change traffic.
    Control,
    /// Sequenced best-effort. Transform samples only.
    Samples,
}

/// One event drained from the transport during a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    PeerConnected(PeerId),
    PeerDisconnected(PeerId),
    Message {
        peer: PeerId,
        channel: ChannelKind,
        payload: Vec<u8>,
    },
}

/// Failed to hand a payload to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendError {
    pub peer: PeerId,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to send to {}", self.peer)
    }
}

impl std::error::Error for SendError {}

/// The port could not be bound for listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindError {
    pub port: u16,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to bind port {}", self.port)
    }
}

impl std::error::Error for BindError {}

/// The outgoing connection could not be established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectError {
    pub address: String,
    pub port: u16,
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to connect to {}:{}", self.address, self.port)
    }
}

impl std::error::Error for ConnectError {}

/// An established link (listening endpoint or outgoing connection).
///
/// All methods are non-blocking; `poll_event` is drained to exhaustion once
/// per tick by the session layer.
pub trait Transport {
    /// Returns the next pending event, or `None` when drained.
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Queues a payload for delivery on the given channel.
    fn send(&mut self, peer: PeerId, channel: ChannelKind, payload: &[u8])
        -> Result<(), SendError>;

    /// Hard ceiling on a single payload's size for this transport.
    fn max_payload(&self) -> usize;

    /// Drops one peer. Queued data for that peer is discarded.
    fn disconnect_peer(&mut self, peer: PeerId);

    /// Tears the whole link down. Further polls return nothing.
    fn shutdown(&mut self);
}

/// Creates transports. The surrounding application chooses the concrete
/// implementation (in-memory loopback here; an ordered-reliable network
/// transport in production) and hands a provider to the session at startup.
pub trait TransportProvider {
    fn bind(&self, port: u16) -> Result<Box<dyn Transport>, BindError>;

    fn connect(&self, address: &str, port: u16) -> Result<Box<dyn Transport>, ConnectError>;
}
