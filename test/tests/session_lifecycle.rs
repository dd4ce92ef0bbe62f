//! Host/client lifecycle over the in-memory loopback transport: hosting,
//! joining, identity exchange, heartbeats, and teardown.

use std::time::Duration;

use tether_session::transport::memory::MemoryNetwork;
use tether_session::{SessionError, SessionEvent, SessionState};
use tether_test::helpers::{init_logging, quiet_config, run_rounds, Participant, TestClock};

const STEP: Duration = Duration::from_millis(50);

fn connected_pair(network: &MemoryNetwork) -> (Participant, Participant, TestClock) {
    let mut host = Participant::with_config(network, "Hosty", quiet_config());
    let mut client = Participant::with_config(network, "Cleo", quiet_config());
    let mut clock = TestClock::new(STEP);
    host.net.start_host(9050).unwrap();
    client.net.connect("127.0.0.1", 9050).unwrap();
    run_rounds(&mut clock, &mut [&mut client, &mut host], 5);
    (host, client, clock)
}

#[test]
fn host_and_client_complete_identity_exchange() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut client, _clock) = connected_pair(&network);

    assert_eq!(host.net.session().state(), SessionState::Hosting);
    assert_eq!(host.net.local_player_id(), Some(0));
    assert_eq!(client.net.session().state(), SessionState::Connected);
    assert_eq!(client.net.local_player_id(), Some(1));

    // the host's directory holds the client's identity
    assert_eq!(host.net.session().peer_count(), 1);
    let record = host.net.session().peers().next().unwrap();
    assert_eq!(record.player_id, Some(1));
    assert_eq!(record.display_name.as_deref(), Some("Cleo"));

    // the client learned the host's name from the welcome
    let host_peer = client.net.session().host_peer().unwrap();
    let host_record = client.net.session().peer(host_peer).unwrap();
    assert_eq!(host_record.display_name.as_deref(), Some("Hosty"));

    let host_events = host.drain_events();
    assert!(host_events.contains(&SessionEvent::PlayerConnected {
        player_id: 1,
        display_name: "Cleo".to_string(),
    }));
    let client_events = client.drain_events();
    assert!(client_events.contains(&SessionEvent::StateChanged(SessionState::Connected)));
    assert!(client_events.contains(&SessionEvent::PlayerConnected {
        player_id: 0,
        display_name: "Hosty".to_string(),
    }));

    assert!(host.net.status().starts_with("Hosting"));
    assert!(client.net.status().starts_with("Connected"));
}

#[test]
fn second_client_learns_the_roster() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut first, mut clock) = connected_pair(&network);
    first.drain_events();

    let mut second = Participant::with_config(&network, "Dana", quiet_config());
    second.net.connect("127.0.0.1", 9050).unwrap();
    run_rounds(&mut clock, &mut [&mut second, &mut host, &mut first], 5);

    assert_eq!(second.net.local_player_id(), Some(2));
    // the newcomer was told about the earlier player, and vice versa
    assert_eq!(second.net.session().remote_player_name(1), Some("Cleo"));
    assert!(first
        .drain_events()
        .contains(&SessionEvent::PlayerConnected {
            player_id: 2,
            display_name: "Dana".to_string(),
        }));
}

#[test]
fn bind_conflict_reports_bind_failed() {
    init_logging();
    let network = MemoryNetwork::new();
    let mut first = Participant::with_config(&network, "A", quiet_config());
    let mut second = Participant::with_config(&network, "B", quiet_config());

    first.net.start_host(9050).unwrap();
    let error = second.net.start_host(9050).unwrap_err();
    assert_eq!(error, SessionError::BindFailed { port: 9050 });
    assert_eq!(second.net.session().state(), SessionState::Disconnected);
    assert_eq!(second.net.session().last_error(), Some(&error));
}

#[test]
fn connect_to_unbound_port_fails() {
    init_logging();
    let network = MemoryNetwork::new();
    let mut client = Participant::with_config(&network, "Cleo", quiet_config());

    let error = client.net.connect("127.0.0.1", 7777).unwrap_err();
    assert_eq!(
        error,
        SessionError::ConnectFailed {
            address: "127.0.0.1".to_string(),
            port: 7777,
        }
    );
    assert_eq!(client.net.session().state(), SessionState::Disconnected);
}

#[test]
fn disconnect_is_idempotent() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut client, mut clock) = connected_pair(&network);
    client.drain_events();
    host.drain_events();

    client.net.disconnect();
    client.net.disconnect();

    let events = client.drain_events();
    let transitions = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::StateChanged(SessionState::Disconnected)))
        .count();
    assert_eq!(transitions, 1);
    assert_eq!(client.net.session().state(), SessionState::Disconnected);
    assert_eq!(client.net.transforms().proxy_count(), 0);

    // the host notices the departure and recycles the slot
    run_rounds(&mut clock, &mut [&mut host], 2);
    assert_eq!(host.net.session().peer_count(), 0);
    assert!(host.drain_events().iter().any(|event| matches!(
        event,
        SessionEvent::PlayerDisconnected { player_id: 1, .. }
    )));
}

#[test]
fn host_shutdown_resets_clients() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut client, mut clock) = connected_pair(&network);
    client.drain_events();

    host.net.disconnect();
    run_rounds(&mut clock, &mut [&mut client], 2);

    assert_eq!(client.net.session().state(), SessionState::Disconnected);
    assert!(client
        .drain_events()
        .contains(&SessionEvent::StateChanged(SessionState::Disconnected)));
    assert_eq!(client.net.session().peer_count(), 0);
}

#[test]
fn heartbeats_populate_rtt() {
    init_logging();
    let network = MemoryNetwork::new();
    let mut host = Participant::with_config(&network, "Hosty", quiet_config());
    let mut client = Participant::with_config(&network, "Cleo", quiet_config());
    let mut clock = TestClock::new(Duration::from_millis(300));
    host.net.start_host(9050).unwrap();
    client.net.connect("127.0.0.1", 9050).unwrap();

    // past the 2-second heartbeat interval plus a round for the pong
    run_rounds(&mut clock, &mut [&mut host, &mut client], 10);

    let record = host.net.session().peers().next().unwrap();
    assert!(record.rtt_millis.is_some());
    let host_peer = client.net.session().host_peer().unwrap();
    assert!(client
        .net
        .session()
        .peer(host_peer)
        .unwrap()
        .rtt_millis
        .is_some());
}
