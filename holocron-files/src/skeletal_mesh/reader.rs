use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use holocron_files_derive_parseable::Parse;
use log::warn;

use crate::ParserError;
use crate::common::iff::IffForm;
use crate::common::reader::{Parseable, read_array, read_chunk_array, read_counted_array};
use crate::common::types::{C2Vector, C3Vector, Tag};
use crate::mesh::types::IndexViolation;
use crate::skeletal_mesh::types::{PerShaderData, SkeletalMeshAsset, SkinnedTriangle};

const SKMG: Tag = *b"SKMG";
const SKMG_VERSION: Tag = *b"0004";

#[derive(Debug, Parse)]
struct SkmgInfo {
    skeleton_count: u32,
    position_count: u32,
    normal_count: u32,
    psdt_count: u32,
}

pub struct SkeletalMeshReader {}

impl SkeletalMeshReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<SkeletalMeshAsset, ParserError> {
        let root = IffForm::read_root(rdr, &SKMG)?;
        let version = root.version(&[SKMG_VERSION])?;

        let info = version.get_mandatory_chunk_by_name::<SkmgInfo>(b"INFO")?;
        let skeletons = read_chunk_array::<String, _>(&mut version.mandatory_chunk(b"SKTM")?.reader())?;
        let positions = version.get_mandatory_chunk_by_name::<Vec<C3Vector>>(b"POSN")?;
        let normals = version
            .get_optional_chunk_by_name::<Vec<C3Vector>>(b"NORM")?
            .unwrap_or_default();

        if skeletons.len() != info.skeleton_count as usize
            || positions.len() != info.position_count as usize
            || normals.len() != info.normal_count as usize
        {
            return Err(ParserError::FormatError {
                reason: "SKMG INFO counts do not match the chunk contents",
            });
        }

        let primitives = version
            .forms_named(b"PSDT")
            .map(|psdt| parse_per_shader_data(psdt, positions.len(), normals.len()))
            .collect::<Result<Vec<_>, ParserError>>()?;

        if primitives.len() != info.psdt_count as usize {
            return Err(ParserError::FormatError {
                reason: "SKMG INFO counts do not match the number of PSDT forms",
            });
        }

        Ok(SkeletalMeshAsset {
            skeletons,
            positions,
            normals,
            primitives,
        })
    }
}

fn parse_pool_indices(
    rdr: &mut impl Read,
    count: usize,
    pool_size: usize,
    reason: &'static str,
) -> Result<Vec<u32>, ParserError> {
    let raw = read_array::<i32, _>(rdr, count)?;
    raw.into_iter()
        .map(|idx| match usize::try_from(idx) {
            Ok(idx) if idx < pool_size => Ok(idx as u32),
            _ => Err(ParserError::FormatError { reason }),
        })
        .collect()
}

fn parse_triangle<R: Read>(rdr: &mut R, occlusion_group: Option<i16>) -> Result<SkinnedTriangle, ParserError> {
    let mut indices = [0u32; 3];
    for idx in indices.iter_mut() {
        // negative indices end up out of range and get reported like every other violation
        *idx = rdr.read_i32::<LittleEndian>()? as u32;
    }
    Ok(SkinnedTriangle {
        occlusion_group,
        indices,
    })
}

fn parse_per_shader_data(
    form: &IffForm,
    position_pool: usize,
    normal_pool: usize,
) -> Result<PerShaderData, ParserError> {
    let shader = form.get_mandatory_chunk_by_name::<String>(b"NAME")?;

    let mut pidx = form.mandatory_chunk(b"PIDX")?.reader();
    let vertex_count = pidx.read_u32::<LittleEndian>()? as usize;
    let position_indices = parse_pool_indices(
        &mut pidx,
        vertex_count,
        position_pool,
        "PIDX references a position outside of POSN",
    )?;

    let normal_indices = match form.chunk(b"NIDX") {
        Some(chunk) => parse_pool_indices(
            &mut chunk.reader(),
            vertex_count,
            normal_pool,
            "NIDX references a normal outside of NORM",
        )?,
        None => Vec::new(),
    };

    let tex_coords = match form.chunk(b"TCSD") {
        Some(chunk) => read_counted_array::<C2Vector, _>(&mut chunk.reader())?,
        None => Vec::new(),
    };

    let mut triangles = Vec::new();
    if let Some(prim) = form.form(b"PRIM") {
        if let Some(itl) = prim.chunk(b"ITL ") {
            let mut rdr = itl.reader();
            let count = rdr.read_u32::<LittleEndian>()?;
            for _ in 0..count {
                triangles.push(parse_triangle(&mut rdr, None)?);
            }
        }
        if let Some(oitl) = prim.chunk(b"OITL") {
            let mut rdr = oitl.reader();
            let count = rdr.read_u32::<LittleEndian>()?;
            for _ in 0..count {
                let group = i16::parse(&mut rdr)?;
                triangles.push(parse_triangle(&mut rdr, Some(group))?);
            }
        }
    }

    let violations: Vec<IndexViolation> = triangles
        .iter()
        .flat_map(|tri| tri.indices)
        .enumerate()
        .filter(|(_, idx)| *idx as usize >= vertex_count)
        .map(|(position, index)| IndexViolation { position, index })
        .collect();

    if !violations.is_empty() {
        warn!(
            "{} triangle indices of {} are out of range (vertex count {})",
            violations.len(),
            shader,
            vertex_count
        );
    }

    Ok(PerShaderData {
        shader,
        position_indices,
        normal_indices,
        tex_coords,
        triangles,
        violations,
    })
}
