use std::sync::Arc;

use glam::Affine3A;
use holocron_files::mesh::types::MeshAsset;
use holocron_files::shader::types::ShaderAsset;
use holocron_files::skeletal_mesh::types::SkeletalMeshAsset;
use holocron_files::skeleton::types::SkeletonAsset;
use holocron_files::sniff::RecordKind;
use holocron_files::terrain::types::TerrainAsset;

use crate::rendering::common::types::TextureImage;

/// A resolved asset. Children are shared, a node referenced from multiple parents exists once.
#[derive(Debug)]
pub enum AssetNode {
    Mesh(MeshNode),
    SkeletalMesh(SkeletalMeshNode),
    Compound(CompoundNode),
    LevelOfDetail(LodNode),
    Skeleton(SkeletonNode),
    Terrain(TerrainNode),
    WorldSnapshot(WorldSnapshotNode),
    InteriorLayout(InteriorLayoutNode),
    /// Appearances, object templates and portal layouts only point at other files
    Group(GroupNode),
    Shader(Arc<ShaderNode>),
}

impl AssetNode {
    pub fn path(&self) -> &str {
        match self {
            AssetNode::Mesh(node) => &node.path,
            AssetNode::SkeletalMesh(node) => &node.path,
            AssetNode::Compound(node) => &node.path,
            AssetNode::LevelOfDetail(node) => &node.path,
            AssetNode::Skeleton(node) => &node.path,
            AssetNode::Terrain(node) => &node.path,
            AssetNode::WorldSnapshot(node) => &node.path,
            AssetNode::InteriorLayout(node) => &node.path,
            AssetNode::Group(node) => &node.path,
            AssetNode::Shader(node) => &node.path,
        }
    }

    /// Every directly resolved child node, without shaders and textures.
    pub fn children(&self) -> Vec<&Arc<AssetNode>> {
        match self {
            AssetNode::Mesh(_) | AssetNode::Terrain(_) | AssetNode::Skeleton(_) | AssetNode::Shader(_) => Vec::new(),
            AssetNode::SkeletalMesh(node) => node.skeletons.iter().collect(),
            AssetNode::Compound(node) => node.children.iter().map(|child| &child.node).collect(),
            AssetNode::LevelOfDetail(node) => node.levels.iter().map(|level| &level.node).collect(),
            AssetNode::WorldSnapshot(node) => {
                let mut children = Vec::new();
                let mut pending = node.roots.iter().collect::<Vec<_>>();
                while let Some(object) = pending.pop() {
                    children.extend(object.node.iter());
                    pending.extend(object.children.iter());
                }
                children
            }
            AssetNode::InteriorLayout(node) => node.children.iter().map(|child| &child.node).collect(),
            AssetNode::Group(node) => node.children.iter().collect(),
        }
    }
}

#[derive(Debug)]
pub struct MeshNode {
    pub path: String,
    pub mesh: MeshAsset,
    /// One entry per primitive set, `None` where the shader could not be loaded
    pub shaders: Vec<Option<Arc<ShaderNode>>>,
}

#[derive(Debug)]
pub struct SkeletalMeshNode {
    pub path: String,
    pub mesh: SkeletalMeshAsset,
    /// The skeletons that could be resolved, always [`AssetNode::Skeleton`]s
    pub skeletons: Vec<Arc<AssetNode>>,
    /// One entry per primitive set
    pub shaders: Vec<Option<Arc<ShaderNode>>>,
}

#[derive(Debug)]
pub struct PlacedChild {
    pub transform: Affine3A,
    pub node: Arc<AssetNode>,
}

#[derive(Debug)]
pub struct CompoundNode {
    pub path: String,
    pub children: Vec<PlacedChild>,
}

#[derive(Debug)]
pub struct LodLevelNode {
    pub near: f32,
    pub far: f32,
    pub node: Arc<AssetNode>,
}

/// Levels keep the order and ranges of the record.
#[derive(Debug)]
pub struct LodNode {
    pub path: String,
    pub levels: Vec<LodLevelNode>,
}

#[derive(Debug)]
pub struct SkeletonNode {
    pub path: String,
    pub skeleton: SkeletonAsset,
}

#[derive(Debug)]
pub struct TerrainNode {
    pub path: String,
    pub terrain: TerrainAsset,
}

#[derive(Debug)]
pub struct WorldObjectNode {
    pub object_id: u32,
    pub template: String,
    /// Relative to the parent object
    pub transform: Affine3A,
    /// `None` when the template could not be loaded, the children are kept regardless
    pub node: Option<Arc<AssetNode>>,
    pub children: Vec<WorldObjectNode>,
}

#[derive(Debug)]
pub struct WorldSnapshotNode {
    pub path: String,
    pub roots: Vec<WorldObjectNode>,
}

#[derive(Debug)]
pub struct InteriorChild {
    pub cell: String,
    pub transform: Affine3A,
    pub node: Arc<AssetNode>,
}

#[derive(Debug)]
pub struct InteriorLayoutNode {
    pub path: String,
    pub children: Vec<InteriorChild>,
}

#[derive(Debug)]
pub struct GroupNode {
    pub path: String,
    pub kind: RecordKind,
    pub children: Vec<Arc<AssetNode>>,
}

#[derive(Debug)]
pub struct ShaderNode {
    pub path: String,
    pub shader: ShaderAsset,
    pub main_texture: Option<Arc<TextureImage>>,
    pub normal_texture: Option<Arc<TextureImage>>,
}
