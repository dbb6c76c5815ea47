//! Frame extraction
//!
//! Reads the scene after the frame's resolve pass and flattens it into a
//! constant-buffer array plus a draw list. Extraction borrows the scene
//! immutably, so no transform can change while a frame is being built.

use bytemuck::{Pod, Zeroable};

use crate::ecs::components::Geometry;
use crate::ecs::Entity;
use crate::foundation::math::Mat4;
use crate::scene::Scene;

use super::ShaderKind;

/// Per-object constant buffer entry
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// World matrix (4×4 column-major)
    pub world: [[f32; 4]; 4],
    /// Inverse world matrix
    pub inverse_world: [[f32; 4]; 4],
    /// Normal matrix, the transposed inverse world matrix
    pub normal: [[f32; 4]; 4],
}

impl ObjectConstants {
    /// Constants for an object with the given cached matrices
    pub fn new(world: &Mat4, inverse_world: &Mat4) -> Self {
        Self {
            world: (*world).into(),
            inverse_world: (*inverse_world).into(),
            normal: inverse_world.transpose().into(),
        }
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// One indexed draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    /// Entity the draw belongs to
    pub entity: Entity,
    /// Index into [`FrameData::objects`]
    pub constants: u32,
    /// First vertex
    pub vertex_offset: u32,
    /// First index
    pub index_offset: u32,
    /// Number of indices
    pub index_count: u32,
    /// Shader to bind
    pub shader: ShaderKind,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameData {
    /// One entry per drawn entity
    pub objects: Vec<ObjectConstants>,
    /// Draws grouped by shader
    pub draws: Vec<DrawItem>,
}

impl FrameData {
    /// The whole constant array as bytes
    pub fn constants_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.objects)
    }

    /// Draws using `shader`
    pub fn draws_for(&self, shader: ShaderKind) -> impl Iterator<Item = &DrawItem> + '_ {
        self.draws.iter().filter(move |draw| draw.shader == shader)
    }
}

/// Build the frame's constants and draw list.
///
/// Entities need both a transform and visible geometry to be drawn. Hidden
/// submeshes are skipped. Draws are sorted by shader, keeping scene order
/// within a shader.
pub fn extract(scene: &Scene) -> FrameData {
    let mut frame = FrameData::default();
    let Some(geometry) = scene.pool::<Geometry>() else {
        return frame;
    };
    let transforms = scene.transform_pool();
    let visible = geometry.storage().visible_column();

    for (row, &entity) in geometry.entities().iter().enumerate() {
        if !visible[row] {
            continue;
        }
        let (Ok(world), Ok(inverse_world)) = (transforms.world(entity), transforms.inverse_world(entity)) else {
            continue;
        };
        let Ok(submeshes) = geometry.submeshes(entity) else {
            continue;
        };

        let Ok(constants) = u32::try_from(frame.objects.len()) else {
            log::warn!("Constant buffer index space exhausted, dropping remaining objects");
            break;
        };
        frame.objects.push(ObjectConstants::new(&world, &inverse_world));
        frame.draws.extend(submeshes.iter().filter(|submesh| submesh.visible).map(|submesh| DrawItem {
            entity,
            constants,
            vertex_offset: submesh.vertex_offset,
            index_offset: submesh.index_offset,
            index_count: submesh.index_count,
            shader: submesh.shader,
        }));
    }

    frame.draws.sort_by_key(|draw| draw.shader);
    log::trace!("Extracted {} objects, {} draws", frame.objects.len(), frame.draws.len());
    frame
}
