use std::collections::VecDeque;

use tether_shared::PlayerId;

use crate::error::SessionError;
use crate::transport::PeerId;

use super::session::SessionState;

/// Notifications published by the session layer each tick. The UI and the
/// tick driver both read from the same drained batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    /// A player finished joining (identity exchange complete).
    PlayerConnected {
        player_id: PlayerId,
        display_name: String,
    },
    PlayerDisconnected {
        player_id: PlayerId,
        display_name: Option<String>,
    },
    /// A received snapshot passed its checksum and was loaded.
    SnapshotLoaded { bytes: usize, label: String },
    /// An outgoing transfer finished; `success` reflects the receiver's ack.
    SnapshotSent { peer: PeerId, success: bool },
    /// A recoverable error was logged and the offending input dropped.
    Error(SessionError),
}

/// Drain-queue the session layer publishes into.
pub struct SessionEvents {
    queue: VecDeque<SessionEvent>,
}

impl SessionEvents {
    pub(crate) fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        self.queue.drain(..).collect()
    }

    // Crate-public push API, mirrored by the services.

    pub(crate) fn push_state_changed(&mut self, state: SessionState) {
        self.queue.push_back(SessionEvent::StateChanged(state));
    }

    pub(crate) fn push_player_connected(&mut self, player_id: PlayerId, display_name: String) {
        self.queue.push_back(SessionEvent::PlayerConnected {
            player_id,
            display_name,
        });
    }

    pub(crate) fn push_player_disconnected(
        &mut self,
        player_id: PlayerId,
        display_name: Option<String>,
    ) {
        self.queue.push_back(SessionEvent::PlayerDisconnected {
            player_id,
            display_name,
        });
    }

    pub(crate) fn push_snapshot_loaded(&mut self, bytes: usize, label: String) {
        self.queue
            .push_back(SessionEvent::SnapshotLoaded { bytes, label });
    }

    pub(crate) fn push_snapshot_sent(&mut self, peer: PeerId, success: bool) {
        self.queue
            .push_back(SessionEvent::SnapshotSent { peer, success });
    }

    pub(crate) fn push_error(&mut self, error: SessionError) {
        self.queue.push_back(SessionEvent::Error(error));
    }
}
