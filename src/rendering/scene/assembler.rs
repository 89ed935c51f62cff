use std::collections::HashMap;
use std::sync::Arc;

use glam::Affine3A;
use itertools::Itertools;
use log::trace;

use crate::rendering::asset_graph::nodes::{AssetNode, WorldObjectNode};
use crate::rendering::common::types::{BoneDescription, GeometryDescription, HeightfieldDescription};
use crate::rendering::importer::mesh_importer::MeshImporter;
use crate::rendering::importer::terrain_importer::TerrainImporter;
use crate::settings::DEFAULT_GRID_SPACING;

/// The receiving end of scene assembly, e.g. a renderer's scene graph. Every call creates one node,
/// nodes can be handed to multiple parents.
pub trait SceneBuilder {
    type Node: Clone;

    fn geometry(&mut self, geometry: &GeometryDescription) -> Self::Node;
    fn group(&mut self, name: &str, children: Vec<(Affine3A, Self::Node)>) -> Self::Node;
    /// Levels in the order of the record, `(near, far, node)`
    fn level_of_detail(&mut self, name: &str, levels: Vec<(f32, f32, Self::Node)>) -> Self::Node;
    fn skeleton(&mut self, name: &str, bones: &[BoneDescription]) -> Self::Node;
    fn heightfield(&mut self, name: &str, heightfield: &HeightfieldDescription) -> Self::Node;
}

/// Walks resolved asset graphs depth-first and replays them into a [`SceneBuilder`]. Asset nodes
/// are memoized by identity, so a node shared in the asset graph is built once and shared in the
/// scene as well, across all graphs assembled by the same assembler.
pub struct SceneAssembler<'a, B: SceneBuilder> {
    builder: &'a mut B,
    grid_spacing: f32,
    // The Arc keeps the key's allocation alive for as long as the entry exists
    built: HashMap<*const AssetNode, (Arc<AssetNode>, B::Node)>,
}

impl<'a, B: SceneBuilder> SceneAssembler<'a, B> {
    pub fn new(builder: &'a mut B) -> Self {
        SceneAssembler {
            builder,
            grid_spacing: DEFAULT_GRID_SPACING,
            built: HashMap::new(),
        }
    }

    pub fn with_grid_spacing(mut self, grid_spacing: f32) -> Self {
        self.grid_spacing = grid_spacing;
        self
    }

    pub fn assemble(&mut self, node: &Arc<AssetNode>) -> B::Node {
        if let Some((_, built)) = self.built.get(&Arc::as_ptr(node)) {
            trace!("Reusing the scene node of {}", node.path());
            return built.clone();
        }

        let built = self.build(node);
        self.built
            .insert(Arc::as_ptr(node), (Arc::clone(node), built.clone()));
        built
    }

    fn build(&mut self, node: &Arc<AssetNode>) -> B::Node {
        profiling::scope!("SceneAssembler::build");
        match node.as_ref() {
            AssetNode::Mesh(mesh) => {
                let geometries = mesh
                    .mesh
                    .tables
                    .iter()
                    .enumerate()
                    .map(|(idx, table)| {
                        let shader = mesh.shaders.get(idx).and_then(Option::as_deref);
                        let geometry = MeshImporter::create_geometry(format!("{}#{}", mesh.path, idx), table, shader);
                        (Affine3A::IDENTITY, self.builder.geometry(&geometry))
                    })
                    .collect_vec();
                self.builder.group(&mesh.path, geometries)
            }
            AssetNode::SkeletalMesh(mesh) => {
                let mut children = mesh
                    .skeletons
                    .iter()
                    .map(|skeleton| (Affine3A::IDENTITY, self.assemble(skeleton)))
                    .collect_vec();
                for (idx, primitive) in mesh.mesh.primitives.iter().enumerate() {
                    let shader = mesh.shaders.get(idx).and_then(Option::as_deref);
                    let geometry = MeshImporter::create_skinned_geometry(
                        format!("{}#{}", mesh.path, idx),
                        &mesh.mesh,
                        primitive,
                        shader,
                    );
                    children.push((Affine3A::IDENTITY, self.builder.geometry(&geometry)));
                }
                self.builder.group(&mesh.path, children)
            }
            AssetNode::Compound(compound) => {
                let children = compound
                    .children
                    .iter()
                    .map(|child| (child.transform, self.assemble(&child.node)))
                    .collect_vec();
                self.builder.group(&compound.path, children)
            }
            AssetNode::LevelOfDetail(lod) => {
                let levels = lod
                    .levels
                    .iter()
                    .map(|level| (level.near, level.far, self.assemble(&level.node)))
                    .collect_vec();
                self.builder.level_of_detail(&lod.path, levels)
            }
            AssetNode::Skeleton(skeleton) => {
                let bones = MeshImporter::create_bones(&skeleton.skeleton);
                self.builder.skeleton(&skeleton.path, &bones)
            }
            AssetNode::Terrain(terrain) => {
                let heightfield = TerrainImporter::create_heightfield(&terrain.terrain, self.grid_spacing);
                self.builder.heightfield(&terrain.path, &heightfield)
            }
            AssetNode::WorldSnapshot(snapshot) => {
                let roots = snapshot
                    .roots
                    .iter()
                    .map(|object| (object.transform, self.world_object(object)))
                    .collect_vec();
                self.builder.group(&snapshot.path, roots)
            }
            AssetNode::InteriorLayout(layout) => {
                let mut cells = Vec::new();
                for (cell, children) in &layout.children.iter().chunk_by(|child| child.cell.as_str()) {
                    let children = children
                        .map(|child| (child.transform, self.assemble(&child.node)))
                        .collect_vec();
                    cells.push((Affine3A::IDENTITY, self.builder.group(cell, children)));
                }
                self.builder.group(&layout.path, cells)
            }
            AssetNode::Group(group) => {
                let children = group
                    .children
                    .iter()
                    .map(|child| (Affine3A::IDENTITY, self.assemble(child)))
                    .collect_vec();
                self.builder.group(&group.path, children)
            }
            // A shader on its own has nothing to show
            AssetNode::Shader(shader) => self.builder.group(&shader.path, Vec::new()),
        }
    }

    /// Children of world objects are placed relative to their parent object.
    fn world_object(&mut self, object: &WorldObjectNode) -> B::Node {
        let mut children = Vec::with_capacity(object.children.len() + 1);
        if let Some(node) = &object.node {
            children.push((Affine3A::IDENTITY, self.assemble(node)));
        }
        for child in &object.children {
            children.push((child.transform, self.world_object(child)));
        }
        self.builder
            .group(&format!("{} ({})", object.template, object.object_id), children)
    }
}
