//! Full-state bootstrap: chunked transfer on join, checksum verification,
//! and the unavailable-state abort path.

use std::time::Duration;

use proptest::prelude::*;

use tether_session::transport::memory::MemoryNetwork;
use tether_session::transport::PeerId;
use tether_session::{SessionError, SessionEvent, SnapshotReceiveState, SnapshotSendState};
use tether_test::helpers::{init_logging, run_rounds, Participant, TestClock};

const STEP: Duration = Duration::from_millis(50);

fn world_blob(len: usize) -> Vec<u8> {
    (0..len).map(|index| (index % 251) as u8).collect()
}

#[test]
fn joining_client_receives_the_world() {
    init_logging();
    let network = MemoryNetwork::new();
    let mut host = Participant::new(&network, "Hosty");
    let mut client = Participant::new(&network, "Cleo");
    let blob = world_blob(100_000);
    host.world.state_blob = Some(blob.clone());
    let mut clock = TestClock::new(STEP);

    host.net.start_host(9050).unwrap();
    client.net.connect("127.0.0.1", 9050).unwrap();
    run_rounds(&mut clock, &mut [&mut client, &mut host], 8);

    // loaded exactly once, byte for byte
    assert_eq!(client.world.loaded_blobs, vec![blob]);
    assert!(client.drain_events().iter().any(|event| matches!(
        event,
        SessionEvent::SnapshotLoaded { bytes: 100_000, label } if label.as_str() == "world"
    )));
    assert!(host.drain_events().iter().any(|event| matches!(
        event,
        SessionEvent::SnapshotSent { success: true, .. }
    )));
    assert!(host.net.snapshot().is_idle());
    assert!(client.net.snapshot().is_idle());
}

#[test]
fn each_joiner_gets_its_own_transfer() {
    init_logging();
    let network = MemoryNetwork::new();
    let mut host = Participant::new(&network, "Hosty");
    let blob = world_blob(30_000);
    host.world.state_blob = Some(blob.clone());
    let mut clock = TestClock::new(STEP);
    host.net.start_host(9050).unwrap();

    let mut first = Participant::new(&network, "Cleo");
    first.net.connect("127.0.0.1", 9050).unwrap();
    run_rounds(&mut clock, &mut [&mut first, &mut host], 6);

    let mut second = Participant::new(&network, "Dana");
    second.net.connect("127.0.0.1", 9050).unwrap();
    run_rounds(&mut clock, &mut [&mut second, &mut host, &mut first], 6);

    assert_eq!(first.world.loaded_blobs, vec![blob.clone()]);
    assert_eq!(second.world.loaded_blobs, vec![blob]);
    assert!(host.net.snapshot().is_idle());
}

#[test]
fn missing_world_state_aborts_the_transfer() {
    init_logging();
    let network = MemoryNetwork::new();
    let mut host = Participant::new(&network, "Hosty");
    let mut client = Participant::new(&network, "Cleo");
    let mut clock = TestClock::new(STEP);

    host.net.start_host(9050).unwrap();
    client.net.connect("127.0.0.1", 9050).unwrap();
    run_rounds(&mut clock, &mut [&mut client, &mut host], 6);

    assert!(host
        .drain_events()
        .contains(&SessionEvent::Error(SessionError::SnapshotUnavailable)));
    // the abort notification reaches the would-be receiver too
    assert!(client
        .drain_events()
        .contains(&SessionEvent::Error(SessionError::SnapshotUnavailable)));
    assert!(client.world.loaded_blobs.is_empty());
    assert!(host.net.snapshot().is_idle());
}

#[test]
fn lost_chunk_surfaces_as_integrity_mismatch() {
    let blob = world_blob(100_000);
    let mut sender = SnapshotSendState::new(PeerId(1), &blob, 8192, "world".to_string());
    let mut receiver = SnapshotReceiveState::new(&sender.start_message()).unwrap();
    assert_eq!(sender.total_chunks(), 13);

    for chunk in sender.next_chunks(usize::MAX) {
        if chunk.index != 5 {
            receiver.store_chunk(chunk);
        }
    }
    let complete = sender.complete_message().unwrap();
    assert!(matches!(
        receiver.assemble(complete.checksum),
        Err(SessionError::IntegrityMismatch { .. })
    ));
}

#[test]
fn corrupted_chunk_surfaces_as_integrity_mismatch() {
    let blob = world_blob(20_000);
    let mut sender = SnapshotSendState::new(PeerId(1), &blob, 4096, "world".to_string());
    let mut receiver = SnapshotReceiveState::new(&sender.start_message()).unwrap();

    for mut chunk in sender.next_chunks(usize::MAX) {
        if chunk.index == 2 {
            chunk.data[100] ^= 0x01;
        }
        receiver.store_chunk(chunk);
    }
    let complete = sender.complete_message().unwrap();
    match receiver.assemble(complete.checksum) {
        Err(SessionError::IntegrityMismatch { expected, computed }) => {
            assert_eq!(expected, complete.checksum);
            assert_ne!(expected, computed);
        }
        other => panic!("expected an integrity mismatch, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn arbitrary_blobs_survive_chunking(
        blob in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk_bytes in 16usize..2048,
    ) {
        let mut sender =
            SnapshotSendState::new(PeerId(1), &blob, chunk_bytes, "prop".to_string());
        let mut receiver = SnapshotReceiveState::new(&sender.start_message()).unwrap();
        for chunk in sender.next_chunks(usize::MAX) {
            receiver.store_chunk(chunk);
        }
        let complete = sender.complete_message().unwrap();
        prop_assert_eq!(receiver.assemble(complete.checksum).unwrap(), blob);
    }
}
