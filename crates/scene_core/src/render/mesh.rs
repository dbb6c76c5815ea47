//! Mesh value objects handed over by asset import
//!
//! File parsing lives with the importers; this module only defines the
//! CPU-side layout that geometry components own and renderers upload.

use bytemuck::{Pod, Zeroable};

/// Vertex structure for 3D meshes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Shader family a submesh is drawn with
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ShaderKind {
    /// Lit opaque shading
    #[default]
    Opaque = 0,
    /// Unlit, not affected by lighting
    Flat = 1,
}

/// Draw range inside a mesh's vertex and index buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    /// First vertex of the range
    pub vertex_offset: u32,
    /// First index of the range
    pub index_offset: u32,
    /// Number of indices to draw
    pub index_count: u32,
    /// Whether the range is drawn
    pub visible: bool,
    /// Shader used for the range
    pub shader: ShaderKind,
}

impl SubMesh {
    /// Visible opaque range
    pub const fn new(vertex_offset: u32, index_offset: u32, index_count: u32) -> Self {
        Self {
            vertex_offset,
            index_offset,
            index_count,
            visible: true,
            shader: ShaderKind::Opaque,
        }
    }

    /// Builder pattern: Set shader
    pub const fn with_shader(mut self, shader: ShaderKind) -> Self {
        self.shader = shader;
        self
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a mesh from vertices and indices
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> u32 {
        u32::try_from(self.vertices.len()).unwrap_or(u32::MAX)
    }

    /// Number of indices
    pub fn index_count(&self) -> u32 {
        u32::try_from(self.indices.len()).unwrap_or(u32::MAX)
    }

    /// Single submesh spanning the whole mesh
    pub fn full_range(&self) -> SubMesh {
        SubMesh::new(0, 0, self.index_count())
    }

    /// Unit cube centred on the origin, four vertices per face
    pub fn cube() -> Self {
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // normal, u axis, v axis
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            #[allow(clippy::cast_possible_truncation)]
            let base = vertices.len() as u32;
            for (cu, cv) in CORNERS {
                let position = [0_usize, 1, 2].map(|axis| normal[axis] * 0.5 + u[axis] * cu + v[axis] * cv);
                vertices.push(Vertex::new(position, normal, [cu + 0.5, cv + 0.5]));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_layout() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
        assert!(cube.indices.iter().all(|&i| i < cube.vertex_count()));
        assert!(cube.vertices.iter().all(|v| v.position.iter().all(|c| c.abs() <= 0.5 + 1e-6)));
    }

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let vertices = [Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.5])];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 32);
    }
}
