use std::io::Cursor;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::writer::{IffWriter, write_cstring};
use crate::mesh::reader::MeshReader;
use crate::mesh::types::{IndexViolation, IndexWidth, VertexFormat};
use crate::mesh::writer::MeshWriter;

const FORMAT: u32 = 0x1 | 0x4 | 0x8 | 0x100;

fn build_mesh(indices: &[u32], wide: bool, table_count: u32) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"MESH").begin_form(b"0005");
    iff.begin_form(b"APPR");
    iff.chunk(b"EXBX", &[1, 2, 3, 4])?;
    iff.end_form()?;

    iff.begin_form(b"SPS ").begin_form(b"0001");
    iff.chunk_with(b"CNT ", |c| Ok(c.write_u32::<LittleEndian>(table_count)?))?;
    iff.begin_form(b"0001");
    iff.chunk_with(b"NAME", |c| write_cstring(c, "shader/crate.sht"))?;
    iff.chunk_with(b"INFO", |c| Ok(c.write_u32::<LittleEndian>(9)?))?;
    iff.begin_form(b"VTXA").begin_form(b"0003");
    iff.chunk_with(b"INFO", |c| {
        c.write_u32::<LittleEndian>(FORMAT)?;
        c.write_u32::<LittleEndian>(4)?;
        Ok(())
    })?;
    iff.chunk_with(b"DATA", |c| {
        for i in 0..4 {
            let f = i as f32;
            for v in [f, f + 0.5, -f] {
                c.write_f32::<LittleEndian>(v)?;
            }
            for v in [0.0, 1.0, 0.0] {
                c.write_f32::<LittleEndian>(v)?;
            }
            c.extend_from_slice(&[0xFF, i as u8, 0x20, 0x30]);
            c.write_f32::<LittleEndian>(f * 0.25)?;
            c.write_f32::<LittleEndian>(1.0 - f * 0.25)?;
        }
        Ok(())
    })?;
    iff.end_form()?.end_form()?;
    iff.chunk_with(b"INDX", |c| {
        c.write_u32::<LittleEndian>(indices.len() as u32)?;
        for idx in indices {
            match wide {
                true => c.write_u32::<LittleEndian>(*idx)?,
                false => c.write_u16::<LittleEndian>(*idx as u16)?,
            }
        }
        Ok(())
    })?;
    iff.end_form()?;
    iff.end_form()?.end_form()?;

    iff.end_form()?.end_form()?;
    iff.finish()
}

#[test]
fn parses_vertex_attributes() -> Result<(), anyhow::Error> {
    let bytes = build_mesh(&[0, 1, 2, 2, 3, 0], false, 1)?;
    let asset = MeshReader::parse_asset(&mut Cursor::new(bytes))?;

    assert!(asset.appearance.is_some());
    assert_eq!(asset.tables.len(), 1);
    let table = &asset.tables[0];
    assert_eq!(table.shader, "shader/crate.sht");
    assert_eq!(table.primitive_type, 9);
    assert_eq!(table.vertex_count(), 4);
    assert!(table.vertices.format.contains(VertexFormat::COLOR));
    assert_eq!(table.vertices.format.tex_coord_sets(), 1);
    assert_eq!(table.vertices.positions[2].y, 2.5);
    assert_eq!(table.vertices.colors[3].a, 0xFF);
    assert_eq!(table.vertices.colors[3].r, 3);
    assert_eq!(table.vertices.tex_coords[0][1].y, 0.75);
    assert_eq!(table.indices.width, IndexWidth::U16);
    assert!(table.violations.is_empty());
    assert_eq!(table.valid_triangles().count(), 2);
    Ok(())
}

#[test]
fn out_of_range_indices_are_reported_not_fatal() -> Result<(), anyhow::Error> {
    let bytes = build_mesh(&[0, 1, 2, 2, 3, 7], false, 1)?;
    let asset = MeshReader::parse_asset(&mut Cursor::new(bytes))?;

    let table = &asset.tables[0];
    assert_eq!(table.violations, vec![IndexViolation { position: 5, index: 7 }]);
    assert_eq!(table.valid_triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    assert_eq!(asset.violations(), 1);
    Ok(())
}

#[test]
fn index_width_follows_chunk_size() -> Result<(), anyhow::Error> {
    let bytes = build_mesh(&[0, 1, 2], true, 1)?;
    let asset = MeshReader::parse_asset(&mut Cursor::new(bytes))?;
    assert_eq!(asset.tables[0].indices.width, IndexWidth::U32);
    assert_eq!(asset.tables[0].indices.indices, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn table_count_has_to_match() -> Result<(), anyhow::Error> {
    let bytes = build_mesh(&[0, 1, 2], false, 2)?;
    let res = MeshReader::parse_asset(&mut Cursor::new(bytes));
    assert!(matches!(res, Err(ParserError::FormatError { .. })));
    Ok(())
}

#[test]
fn rejects_other_records() -> Result<(), anyhow::Error> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"CMPA").begin_form(b"0005");
    iff.end_form()?.end_form()?;
    let res = MeshReader::parse_asset(&mut Cursor::new(iff.finish()?));
    assert!(matches!(res, Err(ParserError::InvalidMagicValue { .. })));
    Ok(())
}

#[test]
fn truncated_mesh_is_an_error() -> Result<(), anyhow::Error> {
    let mut bytes = build_mesh(&[0, 1, 2], false, 1)?;
    bytes.truncate(bytes.len() - 3);
    assert!(MeshReader::parse_asset(&mut Cursor::new(bytes)).is_err());
    Ok(())
}

#[test]
fn decode_encode_reproduces_the_input() -> Result<(), anyhow::Error> {
    for (indices, wide) in [(vec![0, 1, 2, 2, 3, 7], false), (vec![3, 2, 1], true)] {
        let bytes = build_mesh(&indices, wide, 1)?;
        let asset = MeshReader::parse_asset(&mut Cursor::new(bytes.clone()))?;

        let mut encoded = Vec::new();
        MeshWriter::write_asset(&asset, &mut encoded)?;
        assert_eq!(encoded, bytes);
    }
    Ok(())
}
