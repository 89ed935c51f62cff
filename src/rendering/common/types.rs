use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use glam::{Quat, Vec2, Vec3, Vec4};

/// Geometry of one shader primitive set, ready to be handed to a scene builder.
#[derive(Clone)]
pub struct GeometryDescription {
    pub name: String,
    pub vertex_buffers: VertexBuffers,
    /// Triangle list, invalid triangles have already been dropped.
    pub index_buffer: Vec<u32>,
    pub material: Option<MaterialDescription>,
}

impl GeometryDescription {
    pub fn triangle_count(&self) -> usize {
        self.index_buffer.len() / 3
    }
}

impl Debug for GeometryDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ name: {}, vertex_buffers: {:?}, ", self.name, self.vertex_buffers)?;
        write!(f, "index_buffer: [{}], ", self.index_buffer.len())?;
        write!(f, "material: {:?} }}", self.material)
    }
}

#[derive(Clone, Default)]
pub struct VertexBuffers {
    pub position_buffer: Vec<Vec3>,
    pub normals_buffer: Vec<Vec3>,
    /// Every texture coordinate set of the source, in order
    pub texcoord_buffers: Vec<Vec<Vec2>>,
    /// RGBA
    pub vertex_color_0: Vec<[u8; 4]>,
}

impl VertexBuffers {
    pub fn vertex_count(&self) -> usize {
        self.position_buffer.len()
    }

    /// The coordinates of one set, empty when the source has fewer sets.
    pub fn texcoords(&self, set: usize) -> &[Vec2] {
        self.texcoord_buffers.get(set).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Debug for VertexBuffers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ position_buffer: [{}], ", self.position_buffer.len())?;
        write!(f, "normals_buffer: [{}], ", self.normals_buffer.len())?;
        write!(f, "texcoord_buffers: {}x[{}], ", self.texcoord_buffers.len(), self.texcoords(0).len())?;
        write!(f, "vertex_color_0: [{}] }}", self.vertex_color_0.len())
    }
}

#[derive(Debug, Clone)]
pub struct MaterialDescription {
    pub shader: String,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub emissive: Vec4,
    pub specular: Vec4,
    pub shininess: f32,
    pub main_texture: Option<Arc<TextureImage>>,
    /// Texture unit the shader binds the main texture to
    pub main_texture_unit: Option<u8>,
    pub normal_texture: Option<Arc<TextureImage>>,
    pub normal_texture_unit: Option<u8>,
}

/// Decoded texture data, always RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Debug for TextureImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ {}x{}, data: [{}] }}", self.width, self.height, self.data.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneDescription {
    pub name: String,
    pub parent: Option<usize>,
    /// Bind pose relative to the parent
    pub rotation: Quat,
    pub translation: Vec3,
}

/// A square grid of heights. Rows run along +y of the map plane, columns along +x.
#[derive(Clone)]
pub struct HeightfieldDescription {
    /// Map plane position of the first sample
    pub origin: Vec2,
    pub spacing: f32,
    pub rows: usize,
    pub cols: usize,
    /// Row-major
    pub heights: Vec<f32>,
    /// Height of the water plane spanning the whole grid
    pub water_height: f32,
}

impl HeightfieldDescription {
    pub fn height(&self, row: usize, col: usize) -> Option<f32> {
        if col >= self.cols {
            return None;
        }
        self.heights.get(row * self.cols + col).copied()
    }

    /// Map plane position of a sample.
    pub fn position(&self, row: usize, col: usize) -> Vec2 {
        self.origin + Vec2::new(col as f32, row as f32) * self.spacing
    }
}

impl Debug for HeightfieldDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ origin: {:?}, spacing: {}, ", self.origin, self.spacing)?;
        write!(f, "grid: {}x{}, water_height: {:?} }}", self.rows, self.cols, self.water_height)
    }
}
