//! Metadata component: editor-facing name and comment

use crate::ecs::{Component, EcsResult, Entity, Pool, Storage};

/// Metadata component marker; selects the metadata pool
#[derive(Debug, Clone, Copy)]
pub struct Metadata;

impl Component for Metadata {
    const NAME: &'static str = "Metadata";
    type InitInfo = MetadataInfo;
    type Storage = MetadataStorage;
}

/// Initial metadata values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataInfo {
    /// Display name; `Entity_<index>` when absent
    pub name: Option<String>,
    /// Free-form comment
    pub comment: String,
}

impl MetadataInfo {
    /// Metadata with a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            comment: String::new(),
        }
    }
}

/// Column storage of the metadata pool
#[derive(Debug, Clone, Default)]
pub struct MetadataStorage {
    names: Vec<String>,
    comments: Vec<String>,
}

impl Storage for MetadataStorage {
    type InitInfo = MetadataInfo;

    fn reserve(&mut self, additional: usize) {
        self.names.reserve(additional);
        self.comments.reserve(additional);
    }

    fn push(&mut self, owner: Entity, info: MetadataInfo) {
        self.names.push(info.name.unwrap_or_else(|| format!("Entity_{}", owner.index())));
        self.comments.push(info.comment);
    }

    fn swap_remove(&mut self, row: usize, _owner: Entity) {
        self.names.swap_remove(row);
        self.comments.swap_remove(row);
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

impl Pool<Metadata> {
    /// Display name
    pub fn name(&self, entity: Entity) -> EcsResult<&str> {
        Ok(&self.storage().names[self.row(entity)?])
    }

    /// Rename the entity
    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) -> EcsResult<()> {
        let (row, storage) = self.row_mut(entity)?;
        storage.names[row] = name.into();
        Ok(())
    }

    /// Comment text
    pub fn comment(&self, entity: Entity) -> EcsResult<&str> {
        Ok(&self.storage().comments[self.row(entity)?])
    }

    /// Replace the comment text
    pub fn set_comment(&mut self, entity: Entity, comment: impl Into<String>) -> EcsResult<()> {
        let (row, storage) = self.row_mut(entity)?;
        storage.comments[row] = comment.into();
        Ok(())
    }

    /// First entity with the given name, in dense order
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.storage()
            .names
            .iter()
            .position(|candidate| candidate == name)
            .map(|row| self.entities()[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::IdentityRegistry;

    #[test]
    fn test_default_name_uses_index() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Metadata>::new();
        registry.create().unwrap();
        let entity = registry.create().unwrap();

        pool.add(entity, MetadataInfo::default()).unwrap();
        assert_eq!(pool.name(entity), Ok("Entity_1"));
        assert_eq!(pool.comment(entity), Ok(""));
    }

    #[test]
    fn test_rename_and_find() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Metadata>::new();
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        pool.add(a, MetadataInfo::named("camera")).unwrap();
        pool.add(b, MetadataInfo::default()).unwrap();

        pool.set_name(b, "light").unwrap();
        pool.set_comment(b, "key light").unwrap();
        pool.remove(a).unwrap();

        assert_eq!(pool.find_by_name("light"), Some(b));
        assert_eq!(pool.find_by_name("camera"), None);
        assert_eq!(pool.comment(b), Ok("key light"));
    }
}
