use std::io::Cursor;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::writer::{IffWriter, write_cstring};
use crate::skeletal_mesh::reader::SkeletalMeshReader;

fn build_skeletal_mesh(position_indices: &[i32], triangles: &[[i32; 3]]) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"SKMG").begin_form(b"0004");
    iff.chunk_with(b"INFO", |c| {
        for v in [1u32, 3, 1, 1] {
            c.write_u32::<LittleEndian>(v)?;
        }
        Ok(())
    })?;
    iff.chunk_with(b"SKTM", |c| write_cstring(c, "appearance/skeleton/humanoid.skt"))?;
    iff.chunk_with(b"POSN", |c| {
        for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            c.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    })?;
    iff.chunk_with(b"NORM", |c| {
        for v in [0.0f32, 0.0, 1.0] {
            c.write_f32::<LittleEndian>(v)?;
        }
        Ok(())
    })?;

    iff.begin_form(b"PSDT");
    iff.chunk_with(b"NAME", |c| write_cstring(c, "shader/skin.sht"))?;
    iff.chunk_with(b"PIDX", |c| {
        c.write_u32::<LittleEndian>(position_indices.len() as u32)?;
        for idx in position_indices {
            c.write_i32::<LittleEndian>(*idx)?;
        }
        Ok(())
    })?;
    iff.chunk_with(b"NIDX", |c| {
        for _ in position_indices {
            c.write_i32::<LittleEndian>(0)?;
        }
        Ok(())
    })?;
    iff.begin_form(b"PRIM");
    iff.chunk_with(b"INFO", |c| Ok(c.write_u32::<LittleEndian>(1)?))?;
    iff.chunk_with(b"ITL ", |c| {
        c.write_u32::<LittleEndian>(triangles.len() as u32)?;
        for idx in triangles.iter().flatten() {
            c.write_i32::<LittleEndian>(*idx)?;
        }
        Ok(())
    })?;
    iff.end_form()?;
    iff.end_form()?;

    iff.end_form()?.end_form()?;
    iff.finish()
}

#[test]
fn resolves_vertex_pools() -> Result<(), anyhow::Error> {
    let bytes = build_skeletal_mesh(&[2, 1, 0], &[[0, 1, 2]])?;
    let asset = SkeletalMeshReader::parse_asset(&mut Cursor::new(bytes))?;

    assert_eq!(asset.skeletons, vec!["appearance/skeleton/humanoid.skt"]);
    assert_eq!(asset.primitives.len(), 1);
    let psdt = &asset.primitives[0];
    assert_eq!(psdt.shader, "shader/skin.sht");
    assert_eq!(psdt.vertex_count(), 3);

    let positions: Vec<_> = asset.vertex_positions(psdt).collect();
    assert_eq!(positions[0].y, 1.0);
    assert_eq!(positions[1].x, 1.0);
    assert_eq!(asset.vertex_normals(psdt).count(), 3);
    assert_eq!(psdt.valid_triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    Ok(())
}

#[test]
fn triangle_indices_out_of_range_are_reported() -> Result<(), anyhow::Error> {
    let bytes = build_skeletal_mesh(&[0, 1, 2], &[[0, 1, 2], [2, 1, 5]])?;
    let asset = SkeletalMeshReader::parse_asset(&mut Cursor::new(bytes))?;

    let psdt = &asset.primitives[0];
    assert_eq!(psdt.violations.len(), 1);
    assert_eq!(psdt.violations[0].position, 5);
    assert_eq!(psdt.valid_triangles().count(), 1);
    Ok(())
}

#[test]
fn position_indices_have_to_be_in_the_pool() -> Result<(), anyhow::Error> {
    let bytes = build_skeletal_mesh(&[0, 1, 3], &[[0, 1, 2]])?;
    let res = SkeletalMeshReader::parse_asset(&mut Cursor::new(bytes));
    assert!(matches!(res, Err(ParserError::FormatError { .. })));
    Ok(())
}
