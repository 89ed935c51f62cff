use crate::component::types::ComponentAsset;
use crate::layout::types::{InteriorLayoutAsset, PortalLayoutAsset};
use crate::lod::types::LodAsset;
use crate::mesh::types::MeshAsset;
use crate::shader::types::ShaderAsset;
use crate::skeletal_mesh::types::SkeletalMeshAsset;
use crate::skeleton::types::SkeletonAsset;
use crate::template::types::{AppearanceAsset, ObjectTemplateAsset};
use crate::terrain::types::TerrainAsset;
use crate::world::types::WorldSnapshotAsset;

/// Any decoded record. Records never load what they reference, they only name it.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Mesh(MeshAsset),
    SkeletalMesh(SkeletalMeshAsset),
    Compound(ComponentAsset),
    LevelOfDetail(LodAsset),
    Skeleton(SkeletonAsset),
    Terrain(TerrainAsset),
    WorldSnapshot(WorldSnapshotAsset),
    InteriorLayout(InteriorLayoutAsset),
    PortalLayout(PortalLayoutAsset),
    Appearance(AppearanceAsset),
    ObjectTemplate(ObjectTemplateAsset),
    Shader(ShaderAsset),
}

impl Record {
    /// Logical paths of every file this record refers to, in file order.
    pub fn references(&self) -> Vec<&str> {
        match self {
            Record::Mesh(mesh) => mesh.shader_paths().collect(),
            Record::SkeletalMesh(mesh) => mesh
                .skeletons
                .iter()
                .map(String::as_str)
                .chain(mesh.primitives.iter().map(|psdt| psdt.shader.as_str()))
                .collect(),
            Record::Compound(compound) => compound.parts.iter().map(|part| part.path.as_str()).collect(),
            Record::LevelOfDetail(lod) => lod.levels.iter().map(|level| level.path.as_str()).collect(),
            Record::Skeleton(_) | Record::Terrain(_) => Vec::new(),
            Record::WorldSnapshot(snapshot) => snapshot.templates.iter().map(String::as_str).collect(),
            Record::InteriorLayout(layout) => layout.nodes.iter().map(|node| node.object.as_str()).collect(),
            Record::PortalLayout(layout) => layout
                .cells
                .iter()
                .map(|cell| cell.appearance.as_str())
                .filter(|path| !path.is_empty())
                .collect(),
            Record::Appearance(appearance) => vec![appearance.path.as_str()],
            Record::ObjectTemplate(template) => template.referenced_files(),
            Record::Shader(shader) => shader
                .textures
                .iter()
                .map(|binding| binding.path.as_str())
                .collect(),
        }
    }
}
