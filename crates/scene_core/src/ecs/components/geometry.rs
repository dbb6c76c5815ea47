//! Geometry component
//!
//! Owns an imported [`Mesh`] and the submesh draw ranges the renderer reads
//! when building draw commands.

use crate::ecs::{Component, EcsResult, Entity, Pool, Storage};
use crate::render::{Mesh, ShaderKind, SubMesh};

/// Geometry component marker; selects the geometry pool
#[derive(Debug, Clone, Copy)]
pub struct Geometry;

impl Component for Geometry {
    const NAME: &'static str = "Geometry";
    type InitInfo = GeometryInfo;
    type Storage = GeometryStorage;
}

/// Mesh and draw ranges for a new geometry component
#[derive(Debug, Clone, Default)]
pub struct GeometryInfo {
    /// Mesh data
    pub mesh: Mesh,
    /// Draw ranges; empty means one opaque range over the whole mesh
    pub submeshes: Vec<SubMesh>,
}

impl From<Mesh> for GeometryInfo {
    fn from(mesh: Mesh) -> Self {
        Self { mesh, submeshes: Vec::new() }
    }
}

/// Column storage of the geometry pool
#[derive(Debug, Clone, Default)]
pub struct GeometryStorage {
    meshes: Vec<Mesh>,
    submeshes: Vec<Vec<SubMesh>>,
    visible: Vec<bool>,
}

impl GeometryStorage {
    /// Visibility flags in dense-row order
    pub fn visible_column(&self) -> &[bool] {
        &self.visible
    }
}

impl Storage for GeometryStorage {
    type InitInfo = GeometryInfo;

    fn reserve(&mut self, additional: usize) {
        self.meshes.reserve(additional);
        self.submeshes.reserve(additional);
        self.visible.reserve(additional);
    }

    fn push(&mut self, _owner: Entity, info: GeometryInfo) {
        let submeshes = if info.submeshes.is_empty() {
            vec![info.mesh.full_range()]
        } else {
            info.submeshes
        };
        self.meshes.push(info.mesh);
        self.submeshes.push(submeshes);
        self.visible.push(true);
    }

    fn swap_remove(&mut self, row: usize, _owner: Entity) {
        self.meshes.swap_remove(row);
        self.submeshes.swap_remove(row);
        self.visible.swap_remove(row);
    }

    fn len(&self) -> usize {
        self.meshes.len()
    }
}

impl Pool<Geometry> {
    /// Mesh owned by the entity
    pub fn mesh(&self, entity: Entity) -> EcsResult<&Mesh> {
        Ok(&self.storage().meshes[self.row(entity)?])
    }

    /// Draw ranges of the entity's mesh
    pub fn submeshes(&self, entity: Entity) -> EcsResult<&[SubMesh]> {
        Ok(&self.storage().submeshes[self.row(entity)?])
    }

    /// Whether the entity is drawn at all
    pub fn is_visible(&self, entity: Entity) -> EcsResult<bool> {
        Ok(self.storage().visible[self.row(entity)?])
    }

    /// Show or hide every submesh of the entity
    pub fn set_visible(&mut self, entity: Entity, visible: bool) -> EcsResult<()> {
        let (row, storage) = self.row_mut(entity)?;
        storage.visible[row] = visible;
        Ok(())
    }

    /// Append a draw range. Returns its submesh index.
    pub fn add_submesh(&mut self, entity: Entity, submesh: SubMesh) -> EcsResult<usize> {
        let (row, storage) = self.row_mut(entity)?;
        storage.submeshes[row].push(submesh);
        Ok(storage.submeshes[row].len() - 1)
    }

    /// Show or hide one submesh. Returns false if `index` is out of range.
    pub fn set_submesh_visible(&mut self, entity: Entity, index: usize, visible: bool) -> EcsResult<bool> {
        let (row, storage) = self.row_mut(entity)?;
        Ok(storage.submeshes[row]
            .get_mut(index)
            .map(|submesh| submesh.visible = visible)
            .is_some())
    }

    /// Change the shader of one submesh. Returns false if `index` is out of range.
    pub fn set_submesh_shader(&mut self, entity: Entity, index: usize, shader: ShaderKind) -> EcsResult<bool> {
        let (row, storage) = self.row_mut(entity)?;
        Ok(storage.submeshes[row]
            .get_mut(index)
            .map(|submesh| submesh.shader = shader)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::IdentityRegistry;

    #[test]
    fn test_default_submesh_covers_mesh() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Geometry>::new();
        let entity = registry.create().unwrap();

        pool.add(entity, Mesh::cube().into()).unwrap();

        let submeshes = pool.submeshes(entity).unwrap();
        assert_eq!(submeshes.len(), 1);
        assert_eq!(submeshes[0], SubMesh::new(0, 0, 36));
        assert_eq!(pool.is_visible(entity), Ok(true));
    }

    #[test]
    fn test_submesh_edits() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Geometry>::new();
        let entity = registry.create().unwrap();
        let info = GeometryInfo {
            mesh: Mesh::cube(),
            submeshes: vec![SubMesh::new(0, 0, 18), SubMesh::new(12, 18, 18)],
        };
        pool.add(entity, info).unwrap();

        assert_eq!(pool.set_submesh_visible(entity, 1, false), Ok(true));
        assert_eq!(pool.set_submesh_shader(entity, 0, ShaderKind::Flat), Ok(true));
        assert_eq!(pool.set_submesh_visible(entity, 5, false), Ok(false));
        assert_eq!(pool.add_submesh(entity, SubMesh::new(0, 0, 6)), Ok(2));

        let submeshes = pool.submeshes(entity).unwrap();
        assert!(!submeshes[1].visible);
        assert_eq!(submeshes[0].shader, ShaderKind::Flat);
    }

    #[test]
    fn test_missing_geometry() {
        let mut registry = IdentityRegistry::default();
        let mut pool = Pool::<Geometry>::new();
        let entity = registry.create().unwrap();
        assert!(pool.set_visible(entity, false).is_err());
        assert!(pool.mesh(entity).is_err());
    }
}
