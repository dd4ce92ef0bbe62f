//! Human-readable session status, refreshed every tick for display.

use crate::session::{Session, SessionState};
use crate::snapshot::SnapshotEngine;

pub(crate) fn build_status(session: &Session, snapshot: &SnapshotEngine) -> String {
    let mut line = session.state().to_string();

    match session.state() {
        SessionState::Hosting => {
            line.push_str(&format!(" | {} peer(s)", session.peer_count()));
        }
        SessionState::Connected => {
            if let Some(record) = session.host_peer().and_then(|peer| session.peer(peer)) {
                if let Some(rtt) = record.rtt_millis {
                    line.push_str(&format!(" | rtt {rtt:.0} ms"));
                }
            }
        }
        _ => {}
    }

    if let Some((progress, label)) = snapshot.receive_progress() {
        line.push_str(&format!(
            " | receiving '{label}' {:.0}%",
            progress * 100.0
        ));
    }
    for (peer, progress) in snapshot.send_progresses() {
        line.push_str(&format!(" | sending to {peer} {:.0}%", progress * 100.0));
    }

    if let Some(error) = session.last_error() {
        line.push_str(&format!(" | last error: {error}"));
    }

    line
}
