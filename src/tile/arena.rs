//! Generation-checked storage for tile instances

use crate::tile::instance::Instance;

/// Stable reference to an instance owned by a tile.
///
/// A handle outlives the instance it names without dangling: once the slot
/// is freed its generation moves on and lookups through the old handle fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle {
    index: u32,
    generation: u32,
}

impl InstanceHandle {
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    value: Option<Instance>,
}

#[derive(Debug, Clone, Default)]
pub struct InstanceArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl InstanceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, instance: Instance) -> InstanceHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(instance);
            return InstanceHandle { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, value: Some(instance) });
        InstanceHandle { index, generation: 0 }
    }

    pub fn get(&self, handle: InstanceHandle) -> Option<&Instance> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut Instance> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Destroy the instance; the handle (and every copy of it) goes stale
    pub fn remove(&mut self, handle: InstanceHandle) -> Option<Instance> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}
