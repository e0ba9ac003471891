//! Bounded Buffer
//!
//! Fixed-capacity slot storage shared by producers and consumers. Slots
//! are indexed from zero; placement and removal both scan in ascending
//! index order, which keeps replay deterministic.

use serde::Serialize;

use super::process::ProcessId;

/// An item placed into the buffer by a producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Deterministic identity, `item-<step>-<producer>`.
    pub id: String,
    /// The producer that created this item.
    pub produced_by: ProcessId,
    /// The step number of the producing micro-step.
    pub timestamp: u64,
}

impl Item {
    /// Derive the item for the producing micro-step `step_number`.
    pub fn new(step_number: u64, produced_by: ProcessId) -> Self {
        Self {
            id: format!("item-{}-{}", step_number, produced_by),
            produced_by,
            timestamp: step_number,
        }
    }
}

/// One buffer slot, occupied when it carries an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferSlot {
    /// Slot index.
    pub id: usize,
    /// Current occupant, if any.
    pub item: Option<Item>,
}

impl BufferSlot {
    /// Check whether the slot carries an item.
    #[inline(always)]
    pub fn is_occupied(&self) -> bool {
        self.item.is_some()
    }
}

/// The fixed-capacity slot array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundedBuffer {
    slots: Vec<BufferSlot>,
}

impl BoundedBuffer {
    /// Create an all-free buffer of `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|id| BufferSlot { id, item: None }).collect(),
        }
    }

    /// Number of slots.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    /// All slots, in index order.
    pub fn slots(&self) -> &[BufferSlot] {
        &self.slots
    }

    /// Place `item` in the lowest-index free slot.
    ///
    /// Returns the slot index, or `None` when the buffer is full. The
    /// algorithm's semaphore accounting makes the full case unreachable
    /// for a producer holding an `empty` permit.
    pub fn place(&mut self, item: Item) -> Option<usize> {
        let slot = self.slots.iter_mut().find(|slot| !slot.is_occupied())?;
        slot.item = Some(item);
        Some(slot.id)
    }

    /// Remove and return the item in the lowest-index occupied slot.
    pub fn take(&mut self) -> Option<Item> {
        self.slots.iter_mut().find_map(|slot| slot.item.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::{ProcessId, ProcessKind};

    fn item(step: u64) -> Item {
        Item::new(step, ProcessId::new(ProcessKind::Producer, 1))
    }

    #[test]
    fn item_id_is_derived_from_step_and_producer() {
        let it = item(7);
        assert_eq!(it.id, "item-7-P1");
        assert_eq!(it.timestamp, 7);
    }

    #[test]
    fn place_fills_lowest_free_slot() {
        let mut buffer = BoundedBuffer::new(3);
        assert_eq!(buffer.place(item(1)), Some(0));
        assert_eq!(buffer.place(item(2)), Some(1));
        assert_eq!(buffer.occupied_count(), 2);
    }

    #[test]
    fn take_drains_lowest_occupied_slot() {
        let mut buffer = BoundedBuffer::new(3);
        buffer.place(item(1));
        buffer.place(item(2));

        let taken = buffer.take().unwrap();
        assert_eq!(taken.id, "item-1-P1");
        // Slot 0 freed; the next placement reuses it.
        assert_eq!(buffer.place(item(3)), Some(0));
    }

    #[test]
    fn place_on_full_buffer_returns_none() {
        let mut buffer = BoundedBuffer::new(1);
        buffer.place(item(1));
        assert_eq!(buffer.place(item(2)), None);
    }

    #[test]
    fn take_on_empty_buffer_returns_none() {
        let mut buffer = BoundedBuffer::new(2);
        assert_eq!(buffer.take(), None);
    }
}
