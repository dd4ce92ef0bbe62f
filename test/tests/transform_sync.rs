//! Transform sampling, host relay, and proxy interpolation.

use std::time::Duration;

use tether_session::transport::memory::MemoryNetwork;
use tether_shared::Vec3;
use tether_test::helpers::{init_logging, quiet_config, Participant, TestClock};

/// Host plus the named clients, handshakes settled.
fn setup(
    network: &MemoryNetwork,
    names: &[&str],
    step: Duration,
) -> (Participant, Vec<Participant>, TestClock) {
    let mut host = Participant::with_config(network, "Hosty", quiet_config());
    host.net.start_host(9050).unwrap();

    let mut clients = Vec::new();
    for name in names {
        let mut client = Participant::with_config(network, name, quiet_config());
        client.net.connect("127.0.0.1", 9050).unwrap();
        clients.push(client);
    }

    let mut clock = TestClock::new(step);
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
fn samples_flow_from_client_through_host_to_others() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) =
        setup(&network, &["Ana", "Ben"], Duration::from_millis(60));

    clients[0]
        .net
        .update_local_transform(Vec3::new(1.0, 0.0, 2.0), 90.0, Some(1));
    run(&mut host, &mut clients, &mut clock, 4);

    // Ana holds player id 1; the host tracks her proxy and relays to Ben
    let host_proxy = host.net.transforms().proxy(1).unwrap();
    assert_eq!(host_proxy.position(), Vec3::new(1.0, 0.0, 2.0));
    assert_eq!(host_proxy.yaw(), 90.0);
    assert_eq!(host_proxy.motion_state(), Some(1));

    let ben_proxy = clients[1].net.transforms().proxy(1).unwrap();
    assert_eq!(ben_proxy.position(), Vec3::new(1.0, 0.0, 2.0));

    // the sender never grows a proxy for its own entity
    assert_eq!(clients[0].net.transforms().proxy_count(), 0);
}

#[test]
fn distant_target_snaps_instead_of_smoothing() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) =
        setup(&network, &["Ana", "Ben"], Duration::from_millis(60));

    clients[0]
        .net
        .update_local_transform(Vec3::new(1.0, 0.0, 2.0), 0.0, None);
    run(&mut host, &mut clients, &mut clock, 4);

    // well past the teleport threshold
    clients[0]
        .net
        .update_local_transform(Vec3::new(200.0, 0.0, 2.0), 0.0, None);
    run(&mut host, &mut clients, &mut clock, 4);

    let ben_proxy = clients[1].net.transforms().proxy(1).unwrap();
    assert_eq!(ben_proxy.position(), Vec3::new(200.0, 0.0, 2.0));
}

#[test]
fn movement_below_the_thresholds_is_not_sent() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) =
        setup(&network, &["Ana", "Ben"], Duration::from_millis(60));

    clients[0]
        .net
        .update_local_transform(Vec3::new(1.0, 0.0, 2.0), 90.0, None);
    run(&mut host, &mut clients, &mut clock, 4);

    // a hair of drift, no turn: below both gates
    clients[0]
        .net
        .update_local_transform(Vec3::new(1.01, 0.0, 2.0), 90.3, None);
    run(&mut host, &mut clients, &mut clock, 6);

    let ben_proxy = clients[1].net.transforms().proxy(1).unwrap();
    assert_eq!(ben_proxy.target_position(), Vec3::new(1.0, 0.0, 2.0));
}

#[test]
fn samples_are_rate_limited_by_the_interval() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) =
        setup(&network, &["Ana"], Duration::from_millis(20));

    // move far every round; only the 100 ms interval limits sends
    let mut target_changes = 0;
    let mut last_target: Option<Vec3> = None;
    for round in 0..25 {
        let x = (round + 1) as f32 * 50.0;
        clients[0]
            .net
            .update_local_transform(Vec3::new(x, 0.0, 0.0), 0.0, None);
        let now = clock.advance();
        clients[0].tick(now);
        host.tick(now);
        let target = host.net.transforms().proxy(1).map(|proxy| proxy.target_position());
        if target.is_some() && target != last_target {
            target_changes += 1;
            last_target = target;
        }
    }

    // 25 rounds at 20 ms is 500 ms of play: about five interval expiries
    assert!(
        (2..=8).contains(&target_changes),
        "saw {target_changes} sends in 500 ms"
    );
}

#[test]
fn proxies_are_destroyed_on_departure() {
    init_logging();
    let network = MemoryNetwork::new();
    let (mut host, mut clients, mut clock) =
        setup(&network, &["Ana", "Ben"], Duration::from_millis(60));

    clients[0]
        .net
        .update_local_transform(Vec3::new(1.0, 0.0, 2.0), 0.0, None);
    run(&mut host, &mut clients, &mut clock, 4);
    assert!(host.net.transforms().proxy(1).is_some());
    assert!(clients[1].net.transforms().proxy(1).is_some());

    clients[0].net.disconnect();
    run(&mut host, &mut clients, &mut clock, 3);

    // the host drops the proxy on the transport-level departure, the other
    // client on the directory announcement
    assert!(host.net.transforms().proxy(1).is_none());
    assert!(clients[1].net.transforms().proxy(1).is_none());
}
