use crate::common::types::{C2Vector, C3Vector};
use crate::mesh::types::IndexViolation;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SkinnedTriangle {
    /// Only set for triangles from OITL chunks
    pub occlusion_group: Option<i16>,
    pub indices: [u32; 3],
}

/// Geometry drawn with one shader. Vertices are indirections into the shared position and normal
/// pools of the [`SkeletalMeshAsset`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerShaderData {
    pub shader: String,
    pub position_indices: Vec<u32>,
    pub normal_indices: Vec<u32>,
    pub tex_coords: Vec<C2Vector>,
    pub triangles: Vec<SkinnedTriangle>,
    pub violations: Vec<IndexViolation>,
}

impl PerShaderData {
    pub fn vertex_count(&self) -> usize {
        self.position_indices.len()
    }

    pub fn valid_triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let count = self.vertex_count() as u32;
        self.triangles
            .iter()
            .map(|tri| tri.indices)
            .filter(move |tri| tri.iter().all(|&idx| idx < count))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletalMeshAsset {
    pub skeletons: Vec<String>,
    pub positions: Vec<C3Vector>,
    pub normals: Vec<C3Vector>,
    pub primitives: Vec<PerShaderData>,
}

impl SkeletalMeshAsset {
    pub fn vertex_positions<'a>(&'a self, psdt: &'a PerShaderData) -> impl Iterator<Item = C3Vector> + 'a {
        psdt.position_indices
            .iter()
            .filter_map(|&idx| self.positions.get(idx as usize).copied())
    }

    pub fn vertex_normals<'a>(&'a self, psdt: &'a PerShaderData) -> impl Iterator<Item = C3Vector> + 'a {
        psdt.normal_indices
            .iter()
            .filter_map(|&idx| self.normals.get(idx as usize).copied())
    }
}
