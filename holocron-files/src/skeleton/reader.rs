use std::io::Read;

use crate::ParserError;
use crate::common::iff::IffForm;
use crate::common::reader::{Parseable, expect_exhausted, read_array};
use crate::common::types::{C3Vector, C4Quaternion, Tag};
use crate::skeleton::types::{Bone, SkeletonAsset};

const SKTM: Tag = *b"SKTM";
const SKTM_VERSION: Tag = *b"0002";

pub struct SkeletonReader {}

impl SkeletonReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<SkeletonAsset, ParserError> {
        let root = IffForm::read_root(rdr, &SKTM)?;
        let version = root.version(&[SKTM_VERSION])?;

        let count = version.get_mandatory_chunk_by_name::<u32>(b"INFO")? as usize;
        let names = per_bone::<String>(version, b"NAME", count)?;
        let parents = per_bone::<i32>(version, b"PRNT", count)?;
        let pre_rotations = per_bone::<C4Quaternion>(version, b"RPRE", count)?;
        let post_rotations = per_bone::<C4Quaternion>(version, b"RPST", count)?;
        let translations = per_bone::<C3Vector>(version, b"BPTR", count)?;

        let parents = parents
            .into_iter()
            .enumerate()
            .map(|(idx, parent)| match usize::try_from(parent) {
                Err(_) => Ok(None),
                Ok(parent) if parent >= count => Err(ParserError::FormatError {
                    reason: "Bone parent index is out of range",
                }),
                Ok(parent) if parent == idx => Err(ParserError::FormatError {
                    reason: "Bone is its own parent",
                }),
                Ok(parent) => Ok(Some(parent)),
            })
            .collect::<Result<Vec<_>, ParserError>>()?;
        check_acyclic(&parents)?;

        let bones = names
            .into_iter()
            .zip(parents)
            .zip(pre_rotations.into_iter().zip(post_rotations))
            .zip(translations)
            .map(|(((name, parent), (pre_rotation, post_rotation)), translation)| Bone {
                name,
                parent,
                pre_rotation,
                post_rotation,
                translation,
            })
            .collect();

        Ok(SkeletonAsset { bones })
    }
}

/// Reads a chunk that has to hold exactly one value per bone.
fn per_bone<T: Parseable<T>>(form: &IffForm, tag: &Tag, count: usize) -> Result<Vec<T>, ParserError> {
    let mut rdr = form.mandatory_chunk(tag)?.reader();
    let values = read_array::<T, _>(&mut rdr, count)?;
    expect_exhausted(&mut rdr, "Per bone chunk holds more entries than INFO announces")?;
    Ok(values)
}

fn check_acyclic(parents: &[Option<usize>]) -> Result<(), ParserError> {
    for start in 0..parents.len() {
        let mut current = parents[start];
        let mut steps = 0;
        while let Some(idx) = current {
            steps += 1;
            if steps > parents.len() {
                return Err(ParserError::FormatError {
                    reason: "Bone hierarchy contains a cycle",
                });
            }
            current = parents[idx];
        }
    }
    Ok(())
}
