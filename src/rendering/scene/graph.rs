use std::fmt::{Display, Formatter};
use std::sync::Arc;

use glam::Affine3A;

use crate::rendering::common::types::{BoneDescription, GeometryDescription, HeightfieldDescription};
use crate::rendering::scene::assembler::SceneBuilder;

#[derive(Debug)]
pub enum SceneNode {
    Geometry(GeometryDescription),
    Group {
        name: String,
        children: Vec<(Affine3A, Arc<SceneNode>)>,
    },
    LevelOfDetail {
        name: String,
        levels: Vec<(f32, f32, Arc<SceneNode>)>,
    },
    Skeleton {
        name: String,
        bones: Vec<BoneDescription>,
    },
    Heightfield {
        name: String,
        heightfield: HeightfieldDescription,
    },
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Geometry(geometry) => &geometry.name,
            SceneNode::Group { name, .. }
            | SceneNode::LevelOfDetail { name, .. }
            | SceneNode::Skeleton { name, .. }
            | SceneNode::Heightfield { name, .. } => name,
        }
    }
}

/// Counts every node that was built, shared nodes are counted once.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SceneStats {
    pub geometries: usize,
    pub groups: usize,
    pub lods: usize,
    pub skeletons: usize,
    pub heightfields: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl Display for SceneStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} geometries ({} vertices, {} triangles), {} groups, {} lods, {} skeletons, {} heightfields",
            self.geometries, self.vertices, self.triangles, self.groups, self.lods, self.skeletons, self.heightfields
        )
    }
}

/// The in-memory [`SceneBuilder`]: plain [`SceneNode`] trees with shared subtrees.
#[derive(Debug, Default)]
pub struct SceneGraph {
    roots: Vec<Arc<SceneNode>>,
    stats: SceneStats,
}

impl SceneGraph {
    pub fn add_root(&mut self, node: Arc<SceneNode>) {
        self.roots.push(node);
    }

    pub fn roots(&self) -> &[Arc<SceneNode>] {
        &self.roots
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }
}

impl SceneBuilder for SceneGraph {
    type Node = Arc<SceneNode>;

    fn geometry(&mut self, geometry: &GeometryDescription) -> Self::Node {
        self.stats.geometries += 1;
        self.stats.vertices += geometry.vertex_buffers.vertex_count();
        self.stats.triangles += geometry.triangle_count();
        Arc::new(SceneNode::Geometry(geometry.clone()))
    }

    fn group(&mut self, name: &str, children: Vec<(Affine3A, Self::Node)>) -> Self::Node {
        self.stats.groups += 1;
        Arc::new(SceneNode::Group {
            name: name.to_owned(),
            children,
        })
    }

    fn level_of_detail(&mut self, name: &str, levels: Vec<(f32, f32, Self::Node)>) -> Self::Node {
        self.stats.lods += 1;
        Arc::new(SceneNode::LevelOfDetail {
            name: name.to_owned(),
            levels,
        })
    }

    fn skeleton(&mut self, name: &str, bones: &[BoneDescription]) -> Self::Node {
        self.stats.skeletons += 1;
        Arc::new(SceneNode::Skeleton {
            name: name.to_owned(),
            bones: bones.to_vec(),
        })
    }

    fn heightfield(&mut self, name: &str, heightfield: &HeightfieldDescription) -> Self::Node {
        self.stats.heightfields += 1;
        Arc::new(SceneNode::Heightfield {
            name: name.to_owned(),
            heightfield: heightfield.clone(),
        })
    }
}
