//! Script component
//!
//! Attaches user behaviour to an entity. [`ScriptFlags`] select which of the
//! behaviour's callbacks the scene invokes:
//!
//! - `begin` runs once, on the first update after attachment
//! - `update` runs every frame with the frame delta
//! - `destroyed` runs when the component is detached or its entity destroyed

use bitflags::bitflags;

use crate::ecs::{Component, EcsResult, Entity, Pool, Storage};

bitflags! {
    /// Callbacks a script wants to receive
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ScriptFlags: u8 {
        /// Receive `begin`
        const BEGIN = 1 << 0;
        /// Receive `update`
        const UPDATE = 1 << 1;
        /// Receive `destroyed`
        const DESTROYED = 1 << 2;
    }
}

impl Default for ScriptFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// User behaviour driven by the scene's frame update
pub trait ScriptBehaviour: 'static {
    /// First frame after the script was attached
    fn begin(&mut self, _entity: Entity) {}

    /// Every frame; `delta_time` in seconds
    fn update(&mut self, entity: Entity, delta_time: f32);

    /// The script is being detached
    fn destroyed(&mut self, _entity: Entity) {}
}

/// Script component marker; selects the script pool
#[derive(Debug, Clone, Copy)]
pub struct Script;

impl Component for Script {
    const NAME: &'static str = "Script";
    type InitInfo = ScriptInfo;
    type Storage = ScriptStorage;
}

/// Behaviour plus the callbacks it subscribes to
pub struct ScriptInfo {
    /// Behaviour object
    pub behaviour: Box<dyn ScriptBehaviour>,
    /// Subscribed callbacks
    pub flags: ScriptFlags,
}

impl ScriptInfo {
    /// Subscribe `behaviour` to every callback
    pub fn new(behaviour: impl ScriptBehaviour) -> Self {
        Self {
            behaviour: Box::new(behaviour),
            flags: ScriptFlags::all(),
        }
    }

    /// Builder pattern: Set flags
    pub fn with_flags(mut self, flags: ScriptFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Column storage of the script pool
#[derive(Default)]
pub struct ScriptStorage {
    behaviours: Vec<Box<dyn ScriptBehaviour>>,
    flags: Vec<ScriptFlags>,
    started: Vec<bool>,
}

impl Storage for ScriptStorage {
    type InitInfo = ScriptInfo;

    fn reserve(&mut self, additional: usize) {
        self.behaviours.reserve(additional);
        self.flags.reserve(additional);
        self.started.reserve(additional);
    }

    fn push(&mut self, _owner: Entity, info: ScriptInfo) {
        self.behaviours.push(info.behaviour);
        self.flags.push(info.flags);
        self.started.push(false);
    }

    fn swap_remove(&mut self, row: usize, owner: Entity) {
        let mut behaviour = self.behaviours.swap_remove(row);
        let flags = self.flags.swap_remove(row);
        self.started.swap_remove(row);
        if flags.contains(ScriptFlags::DESTROYED) {
            behaviour.destroyed(owner);
        }
    }

    fn len(&self) -> usize {
        self.behaviours.len()
    }
}

impl Pool<Script> {
    /// Subscribed callbacks
    pub fn flags(&self, entity: Entity) -> EcsResult<ScriptFlags> {
        Ok(self.storage().flags[self.row(entity)?])
    }

    /// Replace the subscribed callbacks
    pub fn set_flags(&mut self, entity: Entity, flags: ScriptFlags) -> EcsResult<()> {
        let (row, storage) = self.row_mut(entity)?;
        storage.flags[row] = flags;
        Ok(())
    }

    /// Subscribe to additional callbacks
    pub fn enable(&mut self, entity: Entity, flags: ScriptFlags) -> EcsResult<()> {
        let (row, storage) = self.row_mut(entity)?;
        storage.flags[row].insert(flags);
        Ok(())
    }

    /// Unsubscribe from callbacks
    pub fn disable(&mut self, entity: Entity, flags: ScriptFlags) -> EcsResult<()> {
        let (row, storage) = self.row_mut(entity)?;
        storage.flags[row].remove(flags);
        Ok(())
    }

    /// Run one frame of every script. Returns how many `update` calls ran.
    pub fn run(&mut self, delta_time: f32) -> usize {
        let (owners, storage) = self.parts_mut();
        let mut updated = 0;

        for (row, &entity) in owners.iter().enumerate() {
            let flags = storage.flags[row];
            let behaviour = &mut storage.behaviours[row];

            if !storage.started[row] {
                storage.started[row] = true;
                if flags.contains(ScriptFlags::BEGIN) {
                    behaviour.begin(entity);
                }
            }
            if flags.contains(ScriptFlags::UPDATE) {
                behaviour.update(entity, delta_time);
                updated += 1;
            }
        }

        updated
    }
}
