//! Harness pieces shared by the integration suites.

mod participant;
mod world;

pub use participant::{run_rounds, Participant, TestClock};
pub use world::{EntityState, FixedIdentity, TestWorld};

use tether_session::WorldSessionConfig;

/// Suite config with automatic snapshots off, so lifecycle and change tests
/// stay free of transfer traffic.
pub fn quiet_config() -> WorldSessionConfig {
    let mut config = WorldSessionConfig::default();
    config.snapshot.auto_snapshot = false;
    config
}

/// Routes test log output through the logger. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
