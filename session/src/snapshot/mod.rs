//! Chunked, checksummed bootstrap transfer of the full world state.
//!
//! The host sends one transfer per newly joined peer; a client holds at most
//! one inbound transfer. Chunks travel on the ordered-reliable control
//! channel, so loss only ever surfaces as a checksum mismatch at completion,
//! which is fatal for the transfer (no resume, no per-chunk retransmit).

mod receiver;
mod sender;

pub use receiver::SnapshotReceiveState;
pub use sender::SnapshotSendState;

use std::collections::HashMap;

use log::{info, warn};

use tether_shared::{Message, SnapshotAck, SnapshotChunk, SnapshotComplete, SnapshotStart};

use crate::{
    config::SnapshotConfig,
    error::SessionError,
    session::Session,
    transport::PeerId,
    world::WorldAdapter,
};

/// Frame header: one reserved encoding byte (0 = raw, the hook for future
/// compression) followed by the u64 unframed length.
const FRAME_HEADER_BYTES: usize = 9;
const FRAME_ENCODING_RAW: u8 = 0;

pub(crate) fn frame_blob(blob: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(blob.len() + FRAME_HEADER_BYTES);
    framed.push(FRAME_ENCODING_RAW);
    framed.extend_from_slice(&(blob.len() as u64).to_le_bytes());
    framed.extend_from_slice(blob);
    framed
}

pub(crate) fn unframe_blob(framed: &[u8]) -> Result<&[u8], ()> {
    if framed.len() < FRAME_HEADER_BYTES || framed[0] != FRAME_ENCODING_RAW {
        return Err(());
    }
    let mut length_bytes = [0u8; 8];
    length_bytes.copy_from_slice(&framed[1..9]);
    let declared = u64::from_le_bytes(length_bytes) as usize;
    let body = &framed[FRAME_HEADER_BYTES..];
    if declared != body.len() {
        return Err(());
    }
    Ok(body)
}

/// Both sides of the transfer protocol, driven by the tick loop.
pub struct SnapshotEngine {
    config: SnapshotConfig,
    sends: HashMap<PeerId, SnapshotSendState>,
    receive: Option<SnapshotReceiveState>,
}

impl SnapshotEngine {
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            sends: HashMap::new(),
            receive: None,
        }
    }

    // Sender side

    /// Starts a transfer to one peer. Aborts with `SnapshotUnavailable`
    /// (notifying the peer) when the world has no state to serialize.
    pub fn begin_send(
        &mut self,
        session: &mut Session,
        world: &mut dyn WorldAdapter,
        peer: PeerId,
        label: &str,
    ) {
        if self.sends.contains_key(&peer) {
            warn!("snapshot transfer to {peer} already in flight");
            return;
        }
        let Some(blob) = world.current_state_blob() else {
            session.record_error(SessionError::SnapshotUnavailable);
            let abort = Message::SnapshotAck(SnapshotAck { success: false });
            if let Err(error) = session.send_control(peer, &abort) {
                warn!("failed to notify {peer} of unavailable snapshot: {error}");
            }
            return;
        };

        let state = SnapshotSendState::new(peer, &blob, self.config.chunk_bytes, label.to_string());
        info!(
            "snapshot '{label}' to {peer}: {} bytes in {} chunks",
            blob.len(),
            state.total_chunks()
        );
        let start = Message::SnapshotStart(state.start_message());
        if let Err(error) = session.send_control(peer, &start) {
            warn!("failed to start snapshot to {peer}: {error}");
            return;
        }
        self.sends.insert(peer, state);
    }

    /// Pushes up to the per-tick chunk budget for every in-flight transfer,
    /// followed by the completion message once all chunks are out.
    pub fn tick(&mut self, session: &mut Session) {
        let mut failed: Vec<PeerId> = Vec::new();
        for (peer, state) in self.sends.iter_mut() {
            for chunk in state.next_chunks(self.config.chunks_per_tick) {
                if let Err(error) = session.send_control(*peer, &Message::SnapshotChunk(chunk)) {
                    warn!("snapshot chunk to {peer} failed: {error}");
                    failed.push(*peer);
                    break;
                }
            }
            if failed.contains(peer) {
                continue;
            }
            if let Some(complete) = state.complete_message() {
                if let Err(error) =
                    session.send_control(*peer, &Message::SnapshotComplete(complete))
                {
                    warn!("snapshot completion to {peer} failed: {error}");
                    failed.push(*peer);
                }
            }
        }
        for peer in failed {
            self.sends.remove(&peer);
            session.events().push_snapshot_sent(peer, false);
        }
    }

    // Message handling (both sides)

    pub fn handle_message(
        &mut self,
        session: &mut Session,
        world: &mut dyn WorldAdapter,
        peer: PeerId,
        message: Message,
    ) {
        match message {
            Message::SnapshotStart(start) => self.on_start(session, peer, start),
            Message::SnapshotChunk(chunk) => self.on_chunk(session, chunk),
            Message::SnapshotComplete(complete) => self.on_complete(session, world, peer, complete),
            Message::SnapshotAck(ack) => self.on_ack(session, peer, ack),
            other => {
                warn!("snapshot engine asked to handle {:?}", other.message_type());
            }
        }
    }

    fn on_start(&mut self, session: &mut Session, peer: PeerId, start: SnapshotStart) {
        if session.is_host() {
            session.record_error(SessionError::AuthorityViolation {
                context: "host received a snapshot start",
            });
            return;
        }
        if self.receive.is_some() {
            warn!("snapshot start from {peer} replaces an incomplete transfer");
        }
        match SnapshotReceiveState::new(&start) {
            Ok(state) => {
                info!(
                    "receiving snapshot '{}': {} bytes in {} chunks",
                    start.label, start.total_len, start.chunk_count
                );
                self.receive = Some(state);
            }
            Err(error) => session.record_error(error),
        }
    }

    fn on_chunk(&mut self, session: &mut Session, chunk: SnapshotChunk) {
        if session.is_host() {
            session.record_error(SessionError::AuthorityViolation {
                context: "host received a snapshot chunk",
            });
            return;
        }
        // a chunk with no transfer open is stale traffic from before a
        // reset; drop it silently
        if let Some(state) = self.receive.as_mut() {
            state.store_chunk(chunk);
        }
    }

    fn on_complete(
        &mut self,
        session: &mut Session,
        world: &mut dyn WorldAdapter,
        peer: PeerId,
        complete: SnapshotComplete,
    ) {
        if session.is_host() {
            session.record_error(SessionError::AuthorityViolation {
                context: "host received a snapshot completion",
            });
            return;
        }
        let Some(state) = self.receive.take() else {
            warn!("snapshot completion without an open transfer");
            return;
        };
        let label = state.label().to_string();
        let success = match state.assemble(complete.checksum) {
            Ok(blob) => match world.load_state_blob(&blob) {
                Ok(()) => {
                    info!("snapshot '{label}' loaded: {} bytes", blob.len());
                    session.events().push_snapshot_loaded(blob.len(), label);
                    true
                }
                Err(adapter_error) => {
                    session.record_error(SessionError::AdapterFailure(adapter_error));
                    false
                }
            },
            Err(error) => {
                session.record_error(error);
                false
            }
        };
        let ack = Message::SnapshotAck(SnapshotAck { success });
        if let Err(error) = session.send_control(peer, &ack) {
            warn!("failed to ack snapshot to {peer}: {error}");
        }
    }

    fn on_ack(&mut self, session: &mut Session, peer: PeerId, ack: SnapshotAck) {
        if session.is_host() {
            if self.sends.remove(&peer).is_some() {
                session.events().push_snapshot_sent(peer, ack.success);
            } else {
                warn!("snapshot ack from {peer} with no transfer in flight");
            }
        } else if ack.success {
            warn!("ignoring stray successful snapshot ack from {peer}");
        } else {
            // sender-side abort notification: the host announced it cannot
            // provide a snapshot
            self.receive = None;
            session.record_error(SessionError::SnapshotUnavailable);
        }
    }

    // Lifecycle

    /// Drops all in-flight state involving one peer.
    pub fn handle_disconnect(&mut self, session: &Session, peer: PeerId) {
        self.sends.remove(&peer);
        if !session.is_host() {
            self.receive = None;
        }
    }

    /// Drops everything; called on session reset.
    pub fn clear(&mut self) {
        self.sends.clear();
        self.receive = None;
    }

    pub fn is_idle(&self) -> bool {
        self.sends.is_empty() && self.receive.is_none()
    }

    /// Progress of the outgoing transfer to one peer, 0..=1.
    pub fn send_progress(&self, peer: PeerId) -> Option<f32> {
        self.sends.get(&peer).map(SnapshotSendState::progress)
    }

    /// Progress of every outgoing transfer.
    pub fn send_progresses(&self) -> impl Iterator<Item = (PeerId, f32)> + '_ {
        self.sends
            .iter()
            .map(|(peer, state)| (*peer, state.progress()))
    }

    pub fn auto_snapshot(&self) -> bool {
        self.config.auto_snapshot
    }

    pub fn default_label(&self) -> &str {
        &self.config.default_label
    }

    /// Progress and label of the inbound transfer, if one is open.
    pub fn receive_progress(&self) -> Option<(f32, &str)> {
        self.receive
            .as_ref()
            .map(|state| (state.progress(), state.label()))
    }
}
