//! Host-authoritative object changes: proposal routing, re-attribution,
//! rebroadcast exclusion, and per-tick batching.

use std::time::Duration;

use tether_session::transport::memory::MemoryNetwork;
use tether_session::{SessionError, SessionEvent};
use tether_shared::{ChangeKind, ObjectChangeEvent, ObjectId, TilePos, HOST_PLAYER_ID};
use tether_test::helpers::{init_logging, quiet_config, Participant, TestClock};

const STEP: Duration = Duration::from_millis(50);
const CRATE_ID: ObjectId = 42;

fn change(object_id: ObjectId, kind: ChangeKind) -> ObjectChangeEvent {
    ObjectChangeEvent {
        object_id,
        object_kind: "crate".to_string(),
        tile: TilePos::new(4, 2),
        rotation: 90,
        player_id: HOST_PLAYER_ID,
        kind,
        state: None,
    }
}

/// Host plus the named clients, handshakes settled, with the shared crate
/// entity spawned in every world.
fn setup(network: &MemoryNetwork, names: &[&str]) -> (Participant, Vec<Participant>, TestClock) {
    let mut host = Participant::with_config(network, "Hosty", quiet_config());
    host.world.spawn(CRATE_ID);
    host.net.start_host(9050).unwrap();

    let mut clients = Vec::new();
    for name in names {
        let mut client = Participant::with_config(network, name, quiet_config());
        client.world.spawn(CRATE_ID);
        client.net.connect("127.0.0.1", 9050).unwrap();
        clients.push(client);
    }

    let mut clock = TestClock::new(STEP);
    run(&mut host, &mut clients, &mut clock, 5);
    (host, clients, clock)
}

fn run(host: &mut Participant, clients: &mut [Participant], clock: &mut TestClock, rounds: usize) {
    for _ in 0..rounds {
        let now = clock.advance();
        for client in clients.iter_mut() {
            client.tick(now);
        }
        host.tick(now);
    }
}

#[test]
fn client_proposal_applies_everywhere_except_the_proposer() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) = setup(&network, &["Ana", "Ben", "Cal"]);

    clients[0]
        .net
        .propose_change(change(CRATE_ID, ChangeKind::PickedUp));
    // nothing happens locally until the host answers
    assert!(clients[0].world.entity(CRATE_ID).visible);

    run(&mut host, &mut clients, &mut clock, 4);

    assert!(!host.world.entity(CRATE_ID).visible);
    // the proposer is excluded from the rebroadcast; it already knows
    assert!(clients[0].world.entity(CRATE_ID).visible);
    assert!(!clients[1].world.entity(CRATE_ID).visible);
    assert!(!clients[2].world.entity(CRATE_ID).visible);
}

#[test]
fn accepted_changes_carry_the_hosts_attribution() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) = setup(&network, &["Ana", "Ben"]);

    clients[0]
        .net
        .propose_change(change(CRATE_ID, ChangeKind::StateChanged));
    run(&mut host, &mut clients, &mut clock, 4);

    // Ana joined first and holds player id 1
    assert_eq!(host.world.updates.len(), 1);
    assert_eq!(host.world.updates[0].player_id, 1);
    assert_eq!(clients[1].world.updates.len(), 1);
    assert_eq!(clients[1].world.updates[0].player_id, 1);
    assert!(clients[0].world.updates.is_empty());
}

#[test]
fn host_proposals_reach_every_client() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) = setup(&network, &["Ana", "Ben"]);

    host.net
        .propose_change(change(CRATE_ID, ChangeKind::Dropped));
    run(&mut host, &mut clients, &mut clock, 3);

    for world in [&host.world, &clients[0].world, &clients[1].world] {
        let entity = world.entity(CRATE_ID);
        assert!(entity.visible);
        assert_eq!(entity.tile, TilePos::new(4, 2));
        assert_eq!(entity.rotation, 90);
    }
}

#[test]
fn change_for_an_unknown_object_is_reported() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) = setup(&network, &["Ana", "Ben"]);

    clients[0].net.propose_change(change(99, ChangeKind::PickedUp));
    run(&mut host, &mut clients, &mut clock, 4);

    assert!(host
        .drain_events()
        .contains(&SessionEvent::Error(SessionError::EntityNotFound { id: 99 })));
    // the change is still rebroadcast; the other client reports it too
    assert!(clients[1]
        .drain_events()
        .contains(&SessionEvent::Error(SessionError::EntityNotFound { id: 99 })));
    // the target entity everywhere else is untouched
    assert!(clients[1].world.entity(CRATE_ID).visible);
}

#[test]
fn host_applies_at_most_one_batch_per_tick() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) = setup(&network, &[]);

    for _ in 0..40 {
        host.net
            .propose_change(change(CRATE_ID, ChangeKind::StateChanged));
    }
    run(&mut host, &mut clients, &mut clock, 1);
    assert_eq!(host.world.updates.len(), 16);
    assert_eq!(host.net.changes().pending(), 24);

    run(&mut host, &mut clients, &mut clock, 2);
    assert_eq!(host.world.updates.len(), 40);
    assert_eq!(host.net.changes().pending(), 0);
}
