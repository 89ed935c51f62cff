use holocron_files_derive_parseable::Parse;

use crate::common::types::{C3Vector, C4Quaternion};

/// The raw DATA chunk of a snapshot node.
#[derive(Debug, Copy, Clone, PartialEq, Parse)]
pub struct WorldNodeData {
    pub object_id: u32,
    pub parent_id: u32,
    pub name_index: u32,
    pub cell_index: u32,
    pub rotation: C4Quaternion,
    pub position: C3Vector,
    pub radius: f32,
    pub crc: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldNode {
    pub object_id: u32,
    /// Object template path, resolved from the name table
    pub template: String,
    pub cell_index: u32,
    pub rotation: C4Quaternion,
    pub position: C3Vector,
    pub radius: f32,
    pub children: Vec<WorldNode>,
}

impl WorldNode {
    pub fn descendants(&self) -> usize {
        self.children.iter().map(|child| 1 + child.descendants()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshotAsset {
    pub roots: Vec<WorldNode>,
    pub templates: Vec<String>,
}

impl WorldSnapshotAsset {
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|root| 1 + root.descendants()).sum()
    }
}
