use crate::common::types::{C3Vector, C4Quaternion};

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// `None` for roots
    pub parent: Option<usize>,
    pub pre_rotation: C4Quaternion,
    pub post_rotation: C4Quaternion,
    pub translation: C3Vector,
}

impl Bone {
    /// The bind pose rotation relative to the parent: `pre * post`.
    pub fn rotation(&self) -> C4Quaternion {
        self.pre_rotation * self.post_rotation
    }
}

/// Bones in file order. Multiple roots are allowed, parents are guaranteed to be acyclic.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonAsset {
    pub bones: Vec<Bone>,
}

impl SkeletonAsset {
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.parent.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn children(&self, parent: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, bone)| bone.parent == Some(parent))
            .map(|(idx, _)| idx)
    }
}
