//! In-memory loopback transport.
//!
//! Routes payloads between endpoints in the same process through shared
//! queues, with a process-local port registry so that bind/connect failures
//! behave like the real thing. Used by the test suites and by single-process
//! harnesses; production deployments implement [`Transport`] over an
//! ordered-reliable network link instead.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use super::{
    BindError, ChannelKind, ConnectError, PeerId, SendError, Transport, TransportEvent,
    TransportProvider,
};

/// The id under which the remote host appears in a client's event stream.
pub const HOST_PEER: PeerId = PeerId(0);

const MEMORY_MAX_PAYLOAD: usize = 16 * 1024;

type EventQueue = Arc<Mutex<VecDeque<TransportEvent>>>;

struct PeerLink {
    /// The connected peer's inbox.
    inbox: EventQueue,
    alive: Arc<Mutex<bool>>,
}

struct Listener {
    inbox: EventQueue,
    peers: Arc<Mutex<HashMap<PeerId, PeerLink>>>,
    next_peer: Arc<Mutex<u64>>,
    open: Arc<Mutex<bool>>,
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<u16, Listener>,
}

/// A process-local network. Clone the handle and hand
/// [`MemoryNetwork::provider`] results to each participant.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    registry: Arc<Mutex<Registry>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(&self) -> Box<dyn TransportProvider> {
        Box::new(MemoryProvider {
            registry: self.registry.clone(),
        })
    }
}

struct MemoryProvider {
    registry: Arc<Mutex<Registry>>,
}

impl TransportProvider for MemoryProvider {
    fn bind(&self, port: u16) -> Result<Box<dyn Transport>, BindError> {
        let mut registry = self.registry.lock().unwrap();
        if registry.listeners.contains_key(&port) {
            return Err(BindError { port });
        }
        let inbox: EventQueue = Arc::new(Mutex::new(VecDeque::new()));
        let peers = Arc::new(Mutex::new(HashMap::new()));
        let next_peer = Arc::new(Mutex::new(1u64));
        let open = Arc::new(Mutex::new(true));
        registry.listeners.insert(
            port,
            Listener {
                inbox: inbox.clone(),
                peers: peers.clone(),
                next_peer: next_peer.clone(),
                open: open.clone(),
            },
        );
        Ok(Box::new(HostTransport {
            registry: self.registry.clone(),
            port,
            inbox,
            peers,
            open,
        }))
    }

    fn connect(&self, address: &str, port: u16) -> Result<Box<dyn Transport>, ConnectError> {
        // only loopback addresses exist on a memory network
        if address != "127.0.0.1" && address != "localhost" {
            return Err(ConnectError {
                address: address.to_string(),
                port,
            });
        }
        let registry = self.registry.lock().unwrap();
        let Some(listener) = registry.listeners.get(&port) else {
            return Err(ConnectError {
                address: address.to_string(),
                port,
            });
        };
        if !*listener.open.lock().unwrap() {
            return Err(ConnectError {
                address: address.to_string(),
                port,
            });
        }

        let my_id = {
            let mut next = listener.next_peer.lock().unwrap();
            let id = PeerId(*next);
            *next += 1;
            id
        };
        let inbox: EventQueue = Arc::new(Mutex::new(VecDeque::new()));
        let alive = Arc::new(Mutex::new(true));
        listener.peers.lock().unwrap().insert(
            my_id,
            PeerLink {
                inbox: inbox.clone(),
                alive: alive.clone(),
            },
        );
        listener
            .inbox
            .lock()
            .unwrap()
            .push_back(TransportEvent::PeerConnected(my_id));
        inbox
            .lock()
            .unwrap()
            .push_back(TransportEvent::PeerConnected(HOST_PEER));

        Ok(Box::new(ClientTransport {
            my_id,
            inbox,
            host_inbox: listener.inbox.clone(),
            host_open: listener.open.clone(),
            alive,
        }))
    }
}

struct HostTransport {
    registry: Arc<Mutex<Registry>>,
    port: u16,
    inbox: EventQueue,
    peers: Arc<Mutex<HashMap<PeerId, PeerLink>>>,
    open: Arc<Mutex<bool>>,
}

impl Transport for HostTransport {
    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.inbox.lock().unwrap().pop_front()
    }

    fn send(
        &mut self,
        peer: PeerId,
        channel: ChannelKind,
        payload: &[u8],
    ) -> Result<(), SendError> {
        if payload.len() > MEMORY_MAX_PAYLOAD {
            return Err(SendError { peer });
        }
        let peers = self.peers.lock().unwrap();
        let Some(link) = peers.get(&peer) else {
            return Err(SendError { peer });
        };
        if !*link.alive.lock().unwrap() {
            return Err(SendError { peer });
        }
        link.inbox.lock().unwrap().push_back(TransportEvent::Message {
            peer: HOST_PEER,
            channel,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn max_payload(&self) -> usize {
        MEMORY_MAX_PAYLOAD
    }

    fn disconnect_peer(&mut self, peer: PeerId) {
        let mut peers = self.peers.lock().unwrap();
        if let Some(link) = peers.remove(&peer) {
            *link.alive.lock().unwrap() = false;
            link.inbox
                .lock()
                .unwrap()
                .push_back(TransportEvent::PeerDisconnected(HOST_PEER));
            self.inbox
                .lock()
                .unwrap()
                .push_back(TransportEvent::PeerDisconnected(peer));
        }
    }

    fn shutdown(&mut self) {
        *self.open.lock().unwrap() = false;
        let mut peers = self.peers.lock().unwrap();
        for (_, link) in peers.drain() {
            *link.alive.lock().unwrap() = false;
            link.inbox
                .lock()
                .unwrap()
                .push_back(TransportEvent::PeerDisconnected(HOST_PEER));
        }
        self.registry.lock().unwrap().listeners.remove(&self.port);
    }
}

struct ClientTransport {
    /// Our id in the host's event stream.
    my_id: PeerId,
    inbox: EventQueue,
    host_inbox: EventQueue,
    host_open: Arc<Mutex<bool>>,
    alive: Arc<Mutex<bool>>,
}

impl Transport for ClientTransport {
    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.inbox.lock().unwrap().pop_front()
    }

    fn send(
        &mut self,
        peer: PeerId,
        channel: ChannelKind,
        payload: &[u8],
    ) -> Result<(), SendError> {
        if payload.len() > MEMORY_MAX_PAYLOAD {
            return Err(SendError { peer });
        }
        // a client's only peer is the host
        if peer != HOST_PEER || !*self.alive.lock().unwrap() || !*self.host_open.lock().unwrap() {
            return Err(SendError { peer });
        }
        self.host_inbox
            .lock()
            .unwrap()
            .push_back(TransportEvent::Message {
                peer: self.my_id,
                channel,
                payload: payload.to_vec(),
            });
        Ok(())
    }

    fn max_payload(&self) -> usize {
        MEMORY_MAX_PAYLOAD
    }

    fn disconnect_peer(&mut self, peer: PeerId) {
        if peer == HOST_PEER {
            self.shutdown();
        }
    }

    fn shutdown(&mut self) {
        let mut alive = self.alive.lock().unwrap();
        if *alive {
            *alive = false;
            self.host_inbox
                .lock()
                .unwrap()
                .push_back(TransportEvent::PeerDisconnected(self.my_id));
        }
    }
}
