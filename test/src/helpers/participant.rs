use std::time::{Duration, Instant};

use tether_session::transport::memory::MemoryNetwork;
use tether_session::{SessionEvent, WorldSession, WorldSessionConfig};

use super::world::{FixedIdentity, TestWorld};

/// One process in a scenario: a session plus its scripted world.
pub struct Participant {
    pub net: WorldSession,
    pub world: TestWorld,
}

impl Participant {
    pub fn new(network: &MemoryNetwork, name: &str) -> Self {
        Self::with_config(network, name, WorldSessionConfig::default())
    }

    pub fn with_config(network: &MemoryNetwork, name: &str, config: WorldSessionConfig) -> Self {
        let identity = FixedIdentity::new(name);
        Self {
            net: WorldSession::new(config, network.provider(), &identity),
            world: TestWorld::new(),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.net.tick(now, &mut self.world);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.net.events().drain()
    }
}

/// Deterministic clock for scenario scripts: anchored to real time at
/// construction, advanced by a fixed step per round.
pub struct TestClock {
    now: Instant,
    step: Duration,
}

impl TestClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Instant::now(),
            step,
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self) -> Instant {
        self.now += self.step;
        self.now
    }
}

/// Ticks every participant once per round, in slice order.
pub fn run_rounds(clock: &mut TestClock, participants: &mut [&mut Participant], rounds: usize) {
    for _ in 0..rounds {
        let now = clock.advance();
        for participant in participants.iter_mut() {
            participant.tick(now);
        }
    }
}
