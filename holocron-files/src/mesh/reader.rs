use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use log::warn;

use crate::ParserError;
use crate::common::iff::{IffChunk, IffForm};
use crate::common::reader::{Parseable, expect_exhausted};
use crate::common::types::{C2Vector, C3Vector, CArgb, Tag};
use crate::mesh::types::{
    IndexData, IndexViolation, IndexWidth, MeshAsset, ShaderPrimitiveSet, VertexData, VertexFormat,
};

pub(crate) const MESH: Tag = *b"MESH";
pub(crate) const MESH_VERSION: Tag = *b"0005";
pub(crate) const APPR: Tag = *b"APPR";
pub(crate) const SPS: Tag = *b"SPS ";
pub(crate) const SPS_VERSION: Tag = *b"0001";
pub(crate) const VTXA: Tag = *b"VTXA";
pub(crate) const VTXA_VERSION: Tag = *b"0003";

pub struct MeshReader {}

impl MeshReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<MeshAsset, ParserError> {
        let root = IffForm::read_root(rdr, &MESH)?;
        let version = root.version(&[MESH_VERSION])?;

        let appearance = version
            .children
            .iter()
            .find(|node| node.as_form().is_some_and(|form| form.form_type == APPR))
            .cloned();

        let sps = version.mandatory_form(&SPS)?.version(&[SPS_VERSION])?;
        let table_count = sps.get_mandatory_chunk_by_name::<u32>(b"CNT ")?;
        let tables = sps
            .forms()
            .map(MeshReader::parse_table)
            .collect::<Result<Vec<_>, ParserError>>()?;

        if tables.len() != table_count as usize {
            return Err(ParserError::FormatError {
                reason: "CNT does not match the number of shader primitive sets",
            });
        }

        Ok(MeshAsset { appearance, tables })
    }

    pub(crate) fn parse_table(form: &IffForm) -> Result<ShaderPrimitiveSet, ParserError> {
        let shader = form.get_mandatory_chunk_by_name::<String>(b"NAME")?;
        let primitive_type = form.get_mandatory_chunk_by_name::<u32>(b"INFO")?;

        let vtxa = form.mandatory_form(&VTXA)?.version(&[VTXA_VERSION])?;
        let (format, count) = {
            let mut info = vtxa.mandatory_chunk(b"INFO")?.reader();
            let format = VertexFormat::from_bits_retain(info.read_u32::<LittleEndian>()?);
            (format, info.read_u32::<LittleEndian>()? as usize)
        };
        let vertices = parse_vertex_data(vtxa.mandatory_chunk(b"DATA")?, format, count)?;
        let indices = parse_index_data(form.mandatory_chunk(b"INDX")?)?;

        let violations: Vec<IndexViolation> = indices
            .indices
            .iter()
            .enumerate()
            .filter(|(_, idx)| **idx as usize >= count)
            .map(|(position, idx)| IndexViolation {
                position,
                index: *idx,
            })
            .collect();

        if let Some(first) = violations.first() {
            warn!(
                "Shader primitive set using {} has {} indices out of range (vertex count {}), first is {} at {}",
                shader,
                violations.len(),
                count,
                first.index,
                first.position
            );
        }

        Ok(ShaderPrimitiveSet {
            shader,
            primitive_type,
            vertices,
            indices,
            violations,
        })
    }
}

fn parse_vertex_data(chunk: &IffChunk, format: VertexFormat, count: usize) -> Result<VertexData, ParserError> {
    if format.stride().checked_mul(count) != Some(chunk.data.len()) {
        return Err(ParserError::FormatError {
            reason: "Vertex data size does not match the vertex format",
        });
    }

    let sets = format.tex_coord_sets();
    let has = |flag: VertexFormat| if format.contains(flag) { count } else { 0 };
    let mut vertices = VertexData {
        format,
        count,
        positions: Vec::with_capacity(has(VertexFormat::POSITION)),
        normals: Vec::with_capacity(has(VertexFormat::NORMAL)),
        colors: Vec::with_capacity(has(VertexFormat::COLOR)),
        tex_coords: vec![Vec::with_capacity(count); sets],
    };

    let mut rdr = chunk.reader();
    for _ in 0..count {
        if format.contains(VertexFormat::POSITION) {
            vertices.positions.push(C3Vector::parse(&mut rdr)?);
        }
        if format.contains(VertexFormat::NORMAL) {
            vertices.normals.push(C3Vector::parse(&mut rdr)?);
        }
        if format.contains(VertexFormat::COLOR) {
            vertices.colors.push(CArgb::parse(&mut rdr)?);
        }
        for set in vertices.tex_coords.iter_mut() {
            set.push(C2Vector::parse(&mut rdr)?);
        }
    }

    Ok(vertices)
}

fn parse_index_data(chunk: &IffChunk) -> Result<IndexData, ParserError> {
    let mut rdr = chunk.reader();
    let count = rdr.read_u32::<LittleEndian>()? as usize;
    let payload = chunk.data.len() - 4;

    // the width is not stored anywhere, it follows from the chunk size
    let width = if payload == count * 2 {
        IndexWidth::U16
    } else if payload == count * 4 {
        IndexWidth::U32
    } else {
        return Err(ParserError::FormatError {
            reason: "Index chunk size matches neither 16 nor 32 bit indices",
        });
    };

    let mut indices = Vec::with_capacity(count);
    for _ in 0..count {
        indices.push(match width {
            IndexWidth::U16 => rdr.read_u16::<LittleEndian>()? as u32,
            IndexWidth::U32 => rdr.read_u32::<LittleEndian>()?,
        });
    }
    expect_exhausted(&mut rdr, "Trailing data after the indices")?;

    Ok(IndexData { width, indices })
}
