//! Fixed-capacity ring of fused position records.

use serde::{Deserialize, Serialize};

use crate::types::FusedRecord;

/// Opaque handle to a history slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryIndex(usize);

impl HistoryIndex {
    pub fn get(self) -> usize {
        self.0
    }

    /// True when the slot position is a multiple of `interval` (used for periodic re-anchoring).
    pub fn is_multiple_of(self, interval: usize) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

/// Bounded history: allocated once, slots overwritten oldest-first once full.
#[derive(Clone, Debug)]
pub struct PositionHistory {
    slots: Vec<Option<FusedRecord>>,
    write: usize,
    filled: usize,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        PositionHistory {
            slots: vec![None; capacity],
            write: 0,
            filled: 0,
        }
    }

    /// Write at the cursor and advance it. Overwrites the oldest slot when full.
    pub fn append(&mut self, record: FusedRecord) -> HistoryIndex {
        let index = HistoryIndex(self.write);
        self.slots[self.write] = Some(record);
        self.write = (self.write + 1) % self.slots.len();
        self.filled = (self.filled + 1).min(self.slots.len());
        index
    }

    /// Most recently committed record.
    pub fn latest(&self) -> Option<&FusedRecord> {
        let capacity = self.slots.len();
        self.slots[(self.write + capacity - 1) % capacity].as_ref()
    }

    pub fn at(&self, index: HistoryIndex) -> Option<&FusedRecord> {
        self.slots.get(index.0).and_then(Option::as_ref)
    }

    /// Slot the next `append` will occupy.
    pub fn current_index(&self) -> HistoryIndex {
        HistoryIndex(self.write)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }
}
