//! Generational slot arena backing the element collections.
//!
//! Slots freed by a removal keep their payload's storage and bump their
//! generation; a later insertion may reuse the slot under the new
//! generation. Iteration visits live slots in ascending slot order, which
//! is the fixed tie-break order the update engine's determinism guarantee
//! relies on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Slot<T> {
    Live { generation: u32, value: T },
    Free { generation: u32 },
}

/// Generation-indexed arena with deterministic iteration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated (live + free); attribute columns are
    /// sized to this.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Insert a value, reusing the lowest free slot if one exists.
    ///
    /// Returns `(slot, generation)` for handle construction.
    pub fn insert(&mut self, value: T) -> (u32, u32) {
        if let Some(slot) = self.free.pop() {
            let generation = match &self.slots[slot as usize] {
                Slot::Free { generation } => *generation,
                Slot::Live { .. } => unreachable!("free list points at a live slot"),
            };
            self.slots[slot as usize] = Slot::Live { generation, value };
            self.live += 1;
            (slot, generation)
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot::Live {
                generation: 0,
                value,
            });
            self.live += 1;
            (slot, 0)
        }
    }

    /// Remove the element at `slot` if the generation matches.
    pub fn remove(&mut self, slot: u32, generation: u32) -> Option<T> {
        let entry = self.slots.get_mut(slot as usize)?;
        match entry {
            Slot::Live {
                generation: live_generation,
                ..
            } if *live_generation == generation => {
                let next = generation.wrapping_add(1);
                let old = std::mem::replace(entry, Slot::Free { generation: next });
                self.free.push(slot);
                // Keep the free list sorted descending so `pop` hands out the
                // lowest slot first; insertion order stays deterministic.
                self.free.sort_unstable_by(|a, b| b.cmp(a));
                self.live -= 1;
                match old {
                    Slot::Live { value, .. } => Some(value),
                    Slot::Free { .. } => unreachable!(),
                }
            }
            _ => None,
        }
    }

    /// Access the element at `slot` if the generation matches.
    #[inline]
    pub fn get(&self, slot: u32, generation: u32) -> Option<&T> {
        match self.slots.get(slot as usize) {
            Some(Slot::Live {
                generation: live_generation,
                value,
            }) if *live_generation == generation => Some(value),
            _ => None,
        }
    }

    /// Mutable access to the element at `slot` if the generation matches.
    #[inline]
    pub fn get_mut(&mut self, slot: u32, generation: u32) -> Option<&mut T> {
        match self.slots.get_mut(slot as usize) {
            Some(Slot::Live {
                generation: live_generation,
                value,
            }) if *live_generation == generation => Some(value),
            _ => None,
        }
    }

    /// Whether the handle `(slot, generation)` refers to a live element.
    #[inline]
    pub fn contains(&self, slot: u32, generation: u32) -> bool {
        self.get(slot, generation).is_some()
    }

    /// Current generation of `slot`, live or free.
    pub fn generation_of(&self, slot: u32) -> Option<u32> {
        match self.slots.get(slot as usize)? {
            Slot::Live { generation, .. } | Slot::Free { generation } => Some(*generation),
        }
    }

    /// Iterate live elements as `(slot, generation, &value)` in ascending
    /// slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Slot::Live { generation, value } => Some((slot as u32, *generation, value)),
                Slot::Free { .. } => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::new();
        let (s0, g0) = arena.insert("a");
        let (s1, g1) = arena.insert("b");
        assert_eq!((s0, g0), (0, 0));
        assert_eq!((s1, g1), (1, 0));
        assert_eq!(arena.get(s0, g0), Some(&"a"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn stale_generation_rejected() {
        let mut arena = Arena::new();
        let (slot, generation) = arena.insert(10);
        assert_eq!(arena.remove(slot, generation), Some(10));
        // The freed slot is reused under a bumped generation.
        let (slot2, generation2) = arena.insert(20);
        assert_eq!(slot2, slot);
        assert_eq!(generation2, generation + 1);
        // The old handle no longer resolves.
        assert!(arena.get(slot, generation).is_none());
        assert!(!arena.contains(slot, generation));
        assert_eq!(arena.get(slot2, generation2), Some(&20));
    }

    #[test]
    fn reuse_prefers_lowest_slot() {
        let mut arena = Arena::new();
        let handles: Vec<_> = (0..4).map(|i| arena.insert(i)).collect();
        arena.remove(handles[2].0, handles[2].1);
        arena.remove(handles[0].0, handles[0].1);
        let (slot, _) = arena.insert(100);
        assert_eq!(slot, 0);
        let (slot, _) = arena.insert(200);
        assert_eq!(slot, 2);
    }

    #[test]
    fn iteration_is_slot_ordered() {
        let mut arena = Arena::new();
        for i in 0..5 {
            arena.insert(i);
        }
        arena.remove(1, 0);
        arena.remove(3, 0);
        let slots: Vec<u32> = arena.iter().map(|(slot, _, _)| slot).collect();
        assert_eq!(slots, vec![0, 2, 4]);
    }

    #[test]
    fn double_remove_is_none() {
        let mut arena = Arena::new();
        let (slot, generation) = arena.insert(1);
        assert_eq!(arena.remove(slot, generation), Some(1));
        assert_eq!(arena.remove(slot, generation), None);
    }
}
