use std::{collections::VecDeque, time::Instant};

/// Outstanding pings older than this many entries are abandoned; their pongs
/// will simply not match.
const MAX_OUTSTANDING: usize = 8;

/// Tracks sent ping indices and their send times so a matching pong can be
/// turned into a round-trip-time sample.
pub struct PingStore {
    next_index: u16,
    outstanding: VecDeque<(u16, Instant)>,
}

impl PingStore {
    pub fn new() -> Self {
        Self {
            next_index: 0,
            outstanding: VecDeque::new(),
        }
    }

    /// Records a new ping and returns the index to put on the wire.
    pub fn push(&mut self, now: Instant) -> u16 {
        let index = self.next_index;
        self.next_index = self.next_index.wrapping_add(1);
        if self.outstanding.len() >= MAX_OUTSTANDING {
            self.outstanding.pop_front();
        }
        self.outstanding.push_back((index, now));
        index
    }

    /// Resolves a pong. Returns the matching ping's send time, or `None` for
    /// an unknown/stale index.
    pub fn resolve(&mut self, index: u16) -> Option<Instant> {
        let position = self
            .outstanding
            .iter()
            .position(|(sent_index, _)| *sent_index == index)?;
        let (_, sent_at) = self.outstanding.remove(position)?;
        Some(sent_at)
    }
}

impl Default for PingStore {
    fn default() -> Self {
        Self::new()
    }
}
