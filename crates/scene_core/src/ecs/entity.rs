//! Entity identifiers and the identity registry

use std::fmt;

use super::error::{EcsError, EcsResult};

/// Entity identifier
///
/// A slot index plus the generation that was live when the identifier was
/// issued. Once the slot is destroyed the generation moves on and every copy
/// of the old identifier becomes stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index, usable as a key into sparse per-entity tables
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this identifier was issued
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Pack into a single opaque 64-bit value
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Unpack a value produced by [`Entity::to_bits`]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    live: bool,
}

/// Issues and recycles entity identifiers.
///
/// Pure identity bookkeeping: destroyed slots go on a free list with their
/// generation bumped, so recycled indices never hand out an identifier equal
/// to one issued before.
#[derive(Debug, Clone)]
pub struct IdentityRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: u32,
    capacity: u32,
}

impl IdentityRegistry {
    /// Create a registry that refuses to hold more than `capacity` live entities
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            capacity,
        }
    }

    /// Allocate an identifier, reusing a free slot when one exists
    pub fn create(&mut self) -> EcsResult<Entity> {
        if self.live >= self.capacity {
            return Err(EcsError::CapacityExhausted { capacity: self.capacity });
        }

        let entity = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.live = true;
            Entity::new(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|&index| index != u32::MAX)
                .ok_or(EcsError::CapacityExhausted { capacity: self.capacity })?;
            self.slots.push(Slot { generation: 0, live: true });
            Entity::new(index, 0)
        };

        self.live += 1;
        Ok(entity)
    }

    /// Tombstone an identifier. Returns false if it was already dead.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index as usize];
        slot.live = false;
        self.live -= 1;

        // A slot whose generation would wrap is retired for good.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(entity.index);
        }
        true
    }

    /// Whether the identifier still refers to a live entity
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index as usize)
            .is_some_and(|slot| slot.live && slot.generation == entity.generation)
    }

    /// Fail with [`EcsError::StaleIdentifier`] unless the identifier is alive
    pub fn check(&self, entity: Entity) -> EcsResult<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::StaleIdentifier(entity))
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live as usize
    }

    /// Whether no entity is alive
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Maximum number of live entities
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Iterate over live entities in index order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.live).map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            Entity::new(index as u32, slot.generation)
        })
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::with_capacity(u32::MAX)
    }
}
