use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::writer::{IffWriter, Writable, write_cstring};
use crate::mesh::reader::{MESH, MESH_VERSION, SPS, SPS_VERSION, VTXA, VTXA_VERSION};
use crate::mesh::types::{IndexWidth, MeshAsset, ShaderPrimitiveSet};

/// Encodes meshes into the layout [`crate::mesh::reader::MeshReader`] consumes.
pub struct MeshWriter {}

impl MeshWriter {
    pub fn write_asset<W: Write>(asset: &MeshAsset, w: &mut W) -> Result<(), ParserError> {
        let mut iff = IffWriter::new();
        iff.begin_form(&MESH).begin_form(&MESH_VERSION);
        if let Some(appearance) = &asset.appearance {
            iff.node(appearance)?;
        }

        iff.begin_form(&SPS).begin_form(&SPS_VERSION);
        iff.chunk_with(b"CNT ", |c| Ok(c.write_u32::<LittleEndian>(asset.tables.len() as u32)?))?;
        for (idx, table) in asset.tables.iter().enumerate() {
            let form_type = format!("{:04}", idx + 1);
            let mut tag = [b'0'; 4];
            tag.copy_from_slice(&form_type.as_bytes()[..4]);
            iff.begin_form(&tag);
            MeshWriter::write_table(&mut iff, table)?;
            iff.end_form()?;
        }
        iff.end_form()?.end_form()?;

        iff.end_form()?.end_form()?;
        w.write_all(&iff.finish()?)?;
        Ok(())
    }

    fn write_table(iff: &mut IffWriter, table: &ShaderPrimitiveSet) -> Result<(), ParserError> {
        iff.chunk_with(b"NAME", |c| write_cstring(c, &table.shader))?;
        iff.chunk_with(b"INFO", |c| Ok(c.write_u32::<LittleEndian>(table.primitive_type)?))?;

        let vertices = &table.vertices;
        iff.begin_form(&VTXA).begin_form(&VTXA_VERSION);
        iff.chunk_with(b"INFO", |c| {
            c.write_u32::<LittleEndian>(vertices.format.bits())?;
            c.write_u32::<LittleEndian>(vertices.count as u32)?;
            Ok(())
        })?;
        iff.chunk_with(b"DATA", |c| {
            for i in 0..vertices.count {
                if let Some(position) = vertices.positions.get(i) {
                    position.write(c)?;
                }
                if let Some(normal) = vertices.normals.get(i) {
                    normal.write(c)?;
                }
                if let Some(color) = vertices.colors.get(i) {
                    color.write(c)?;
                }
                for set in &vertices.tex_coords {
                    set.get(i)
                        .ok_or(ParserError::FormatError {
                            reason: "Texture coordinate set is shorter than the vertex count",
                        })?
                        .write(c)?;
                }
            }
            Ok(())
        })?;
        iff.end_form()?.end_form()?;

        let indices = &table.indices;
        iff.chunk_with(b"INDX", |c| {
            c.write_u32::<LittleEndian>(indices.indices.len() as u32)?;
            for idx in &indices.indices {
                match indices.width {
                    IndexWidth::U16 => c.write_u16::<LittleEndian>(*idx as u16)?,
                    IndexWidth::U32 => c.write_u32::<LittleEndian>(*idx)?,
                }
            }
            Ok(())
        })?;
        Ok(())
    }
}
