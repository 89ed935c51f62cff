use std::collections::HashMap;
use std::io::Read;

use crate::ParserError;
use crate::common::iff::IffForm;
use crate::common::types::Tag;
use crate::lod::types::{LodAsset, LodChild, LodInfoEntry, LodLevel};

const DTLA: Tag = *b"DTLA";
const DTLA_VERSION: Tag = *b"0007";
const MLOD: Tag = *b"MLOD";
const MLOD_VERSION: Tag = *b"0000";

/// Distance band every level of a mesh LOD covers, level `i` spans `[i * 100, (i + 1) * 100)`.
pub const MESH_LOD_RANGE: f32 = 100.0;

pub struct LodReader {}

impl LodReader {
    /// Parses a detail appearance (`DTLA`).
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<LodAsset, ParserError> {
        let root = IffForm::read_root(rdr, &DTLA)?;
        let version = root.version(&[DTLA_VERSION])?;

        let entries = version.get_mandatory_chunk_by_name::<Vec<LodInfoEntry>>(b"INFO")?;
        let children: HashMap<i32, String> = version
            .mandatory_form(b"DATA")?
            .chunks_named(b"CHLD")
            .map(|chunk| chunk.parse::<LodChild>().map(|child| (child.id, child.path)))
            .collect::<Result<_, ParserError>>()?;

        let levels = entries
            .into_iter()
            .map(|entry| {
                let path = children.get(&entry.id).ok_or(ParserError::FormatError {
                    reason: "INFO references a child id without CHLD",
                })?;
                Ok(LodLevel {
                    path: path.clone(),
                    near: entry.near,
                    far: entry.far,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        Ok(LodAsset { levels })
    }

    /// Parses a mesh LOD (`MLOD`), a plain list of meshes from most to least detailed.
    pub fn parse_mesh_lod<R: Read>(rdr: &mut R) -> Result<LodAsset, ParserError> {
        let root = IffForm::read_root(rdr, &MLOD)?;
        let version = root.version(&[MLOD_VERSION])?;

        let count = version.get_mandatory_chunk_by_name::<u16>(b"INFO")? as usize;
        let names = version
            .chunks_named(b"NAME")
            .map(|chunk| chunk.parse::<String>())
            .collect::<Result<Vec<_>, ParserError>>()?;
        if names.len() != count {
            return Err(ParserError::FormatError {
                reason: "MLOD INFO does not match the number of NAME chunks",
            });
        }

        let levels = names
            .into_iter()
            .enumerate()
            .map(|(i, path)| LodLevel {
                path,
                near: i as f32 * MESH_LOD_RANGE,
                far: (i + 1) as f32 * MESH_LOD_RANGE,
            })
            .collect();

        Ok(LodAsset { levels })
    }
}
