mod events;
mod peer;
mod ping;
#[allow(clippy::module_inception)]
mod session;

pub use events::{SessionEvent, SessionEvents};
pub use peer::{PeerRecord, PeerRole};
pub use ping::PingStore;
pub use session::{RoutedEvent, Session, SessionState};
