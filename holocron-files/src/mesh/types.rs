use bitflags::bitflags;

use crate::common::iff::IffNode;
use crate::common::types::{C2Vector, C3Vector, CArgb};

bitflags! {
    /// The per table vertex layout. Bits 8..11 carry the number of texture coordinate sets.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct VertexFormat: u32 {
        const POSITION = 0x1;
        const NORMAL = 0x4;
        const COLOR = 0x8;
        const TEX_COORD_SETS = 0xF00;
    }
}

impl VertexFormat {
    pub fn tex_coord_sets(&self) -> usize {
        ((self.bits() & Self::TEX_COORD_SETS.bits()) >> 8) as usize
    }

    /// Size of one vertex inside of the DATA chunk.
    pub fn stride(&self) -> usize {
        let mut stride = 8 * self.tex_coord_sets();
        if self.contains(VertexFormat::POSITION) {
            stride += 12;
        }
        if self.contains(VertexFormat::NORMAL) {
            stride += 12;
        }
        if self.contains(VertexFormat::COLOR) {
            stride += 4;
        }
        stride
    }
}

/// Structure of arrays, every present attribute has exactly `count` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub format: VertexFormat,
    pub count: usize,
    pub positions: Vec<C3Vector>,
    pub normals: Vec<C3Vector>,
    pub colors: Vec<CArgb>,
    pub tex_coords: Vec<Vec<C2Vector>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexData {
    pub width: IndexWidth,
    pub indices: Vec<u32>,
}

/// An index that points past the end of the vertex data of its table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexViolation {
    /// Position inside of the index list
    pub position: usize,
    pub index: u32,
}

/// One draw call worth of geometry: a shader and the primitives drawn with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPrimitiveSet {
    pub shader: String,
    pub primitive_type: u32,
    pub vertices: VertexData,
    pub indices: IndexData,
    pub violations: Vec<IndexViolation>,
}

impl ShaderPrimitiveSet {
    pub fn vertex_count(&self) -> usize {
        self.vertices.count
    }

    /// Triangles whose three indices are all in range. Trailing indices that do not form a full
    /// triangle are dropped.
    pub fn valid_triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let count = self.vertices.count as u32;
        self.indices
            .indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .filter(move |tri| tri.iter().all(|&idx| idx < count))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshAsset {
    /// Kept verbatim for re-encoding, nothing in here is interpreted.
    pub appearance: Option<IffNode>,
    pub tables: Vec<ShaderPrimitiveSet>,
}

impl MeshAsset {
    pub fn shader_paths(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.shader.as_str())
    }

    pub fn violations(&self) -> usize {
        self.tables.iter().map(|table| table.violations.len()).sum()
    }
}
