use std::collections::VecDeque;

/// Hands out player ids, recycling the ids of departed peers before minting
/// new ones. The host constructs this starting above its own reserved id.
pub struct KeyGenerator {
    recycled: VecDeque<i32>,
    next: i32,
}

impl KeyGenerator {
    pub fn new(first: i32) -> Self {
        Self {
            recycled: VecDeque::new(),
            next: first,
        }
    }

    pub fn generate(&mut self) -> i32 {
        if let Some(id) = self.recycled.pop_front() {
            return id;
        }
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn recycle(&mut self, id: i32) {
        self.recycled.push_back(id);
    }
}
