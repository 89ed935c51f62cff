use std::collections::HashMap;
use std::io::Read;

use crate::ParserError;
use crate::common::iff::IffForm;
use crate::common::reader::read_counted_array;
use crate::common::types::Tag;
use crate::world::types::{WorldNode, WorldNodeData, WorldSnapshotAsset};

const WSNP: Tag = *b"WSNP";
const WSNP_VERSION: Tag = *b"0001";
const NODE_VERSION: Tag = *b"0000";

/// Parent id of nodes that hang directly below the snapshot.
pub const ROOT_PARENT_ID: u32 = 0;

struct PendingNode {
    data: WorldNodeData,
    children: Vec<usize>,
}

pub struct WorldSnapshotReader {}

impl WorldSnapshotReader {
    /// Parents have to precede their children, the tree is linked while the nodes are read and a
    /// forward reference is a format error.
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<WorldSnapshotAsset, ParserError> {
        let root = IffForm::read_root(rdr, &WSNP)?;
        let version = root.version(&[WSNP_VERSION])?;

        let templates = read_counted_array::<String, _>(&mut version.mandatory_chunk(b"OTNL")?.reader())?;

        let mut arena = Vec::<PendingNode>::new();
        let mut roots = Vec::new();
        let mut ids = HashMap::<u32, usize>::new();
        for node in version.mandatory_form(b"NODS")?.forms_named(b"NODE") {
            let data = node
                .version(&[NODE_VERSION])?
                .get_mandatory_chunk_by_name::<WorldNodeData>(b"DATA")?;

            if data.object_id == ROOT_PARENT_ID || ids.contains_key(&data.object_id) {
                return Err(ParserError::FormatError {
                    reason: "Duplicate or reserved object id in world snapshot",
                });
            }
            if data.name_index as usize >= templates.len() {
                return Err(ParserError::FormatError {
                    reason: "World snapshot node references a name outside of OTNL",
                });
            }

            let idx = arena.len();
            match data.parent_id {
                ROOT_PARENT_ID => roots.push(idx),
                parent_id => {
                    let parent = ids.get(&parent_id).ok_or(ParserError::FormatError {
                        reason: "World snapshot node references a parent that was not read yet",
                    })?;
                    arena[*parent].children.push(idx);
                }
            }

            ids.insert(data.object_id, idx);
            arena.push(PendingNode {
                data,
                children: Vec::new(),
            });
        }

        let roots = roots
            .into_iter()
            .map(|idx| link(&arena, &templates, idx))
            .collect();

        Ok(WorldSnapshotAsset { roots, templates })
    }
}

fn link(arena: &[PendingNode], templates: &[String], idx: usize) -> WorldNode {
    let pending = &arena[idx];
    WorldNode {
        object_id: pending.data.object_id,
        template: templates[pending.data.name_index as usize].clone(),
        cell_index: pending.data.cell_index,
        rotation: pending.data.rotation,
        position: pending.data.position,
        radius: pending.data.radius,
        children: pending
            .children
            .iter()
            .map(|child| link(arena, templates, *child))
            .collect(),
    }
}
