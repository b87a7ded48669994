//! Fixed-capacity history of recent events per room.

use std::collections::VecDeque;

use super::entity::ChatEvent;

/// Bounded FIFO of the most recent events of one room.
///
/// Never holds more than `capacity` events; the oldest is evicted first.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    events: VecDeque<ChatEvent>,
    capacity: usize,
}

impl HistoryRing {
    /// Create an empty ring. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a ring pre-filled with `events` (chronological order),
    /// keeping only the newest `capacity` of them.
    pub fn with_events(capacity: usize, events: impl IntoIterator<Item = ChatEvent>) -> Self {
        let mut ring = Self::new(capacity);
        for event in events {
            ring.push(event);
        }
        ring
    }

    pub fn push(&mut self, event: ChatEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Current contents, oldest first.
    pub fn recent(&self) -> Vec<ChatEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
