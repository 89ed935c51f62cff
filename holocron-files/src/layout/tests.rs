use std::io::Cursor;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;
use crate::common::types::CTransform;
use crate::common::writer::{IffWriter, Writable, write_cstring};
use crate::layout::reader::{InteriorLayoutReader, PortalLayoutReader};

#[test]
fn interior_nodes_carry_cells_and_transforms() -> Result<(), anyhow::Error> {
    let mut moved = CTransform::IDENTITY;
    moved.rows[0][3] = 3.0;

    let mut iff = IffWriter::new();
    iff.begin_form(b"INLY").begin_form(b"0000");
    for (object, cell, transform) in [
        ("object/tangible/furniture/chair.iff", "lobby", CTransform::IDENTITY),
        ("object/tangible/furniture/table.iff", "hall", moved),
    ] {
        iff.chunk_with(b"NODE", |c| {
            write_cstring(c, object)?;
            write_cstring(c, cell)?;
            transform.write(c)
        })?;
    }
    iff.end_form()?.end_form()?;

    let asset = InteriorLayoutReader::parse_asset(&mut Cursor::new(iff.finish()?))?;
    assert_eq!(asset.nodes.len(), 2);
    assert_eq!(asset.nodes[1].cell, "hall");
    assert_eq!(asset.nodes[1].object, "object/tangible/furniture/table.iff");
    assert_eq!(asset.nodes[1].transform.translation().x, 3.0);
    Ok(())
}

fn build_portal_layout(cell_count: u32) -> Result<Vec<u8>, ParserError> {
    let mut iff = IffWriter::new();
    iff.begin_form(b"PRTO").begin_form(b"0003");
    iff.chunk_with(b"DATA", |c| {
        c.write_u32::<LittleEndian>(4)?;
        Ok(c.write_u32::<LittleEndian>(cell_count)?)
    })?;
    iff.begin_form(b"PRTS");
    iff.chunk(b"PRTL", &[0; 8])?;
    iff.end_form()?;
    iff.begin_form(b"CELS");
    for (name, floor) in [("r0", None), ("lobby", Some("appearance/collision/lobby.flr"))] {
        iff.begin_form(b"CELL").begin_form(b"0005");
        iff.chunk_with(b"DATA", |c| {
            c.write_u32::<LittleEndian>(2)?;
            c.write_u8(1)?;
            write_cstring(c, name)?;
            write_cstring(c, &format!("appearance/mesh/{}.msh", name))?;
            match floor {
                Some(floor) => {
                    c.write_u8(1)?;
                    write_cstring(c, floor)
                }
                None => Ok(c.write_u8(0)?),
            }
        })?;
        iff.end_form()?.end_form()?;
    }
    iff.end_form()?;
    iff.end_form()?.end_form()?;
    iff.finish()
}

#[test]
fn portal_cells_reference_appearances() -> Result<(), anyhow::Error> {
    let asset = PortalLayoutReader::parse_asset(&mut Cursor::new(build_portal_layout(2)?))?;
    assert_eq!(asset.portal_count, 4);
    assert_eq!(asset.cells.len(), 2);
    assert_eq!(asset.cells[0].floor, None);
    assert_eq!(asset.cells[1].appearance, "appearance/mesh/lobby.msh");
    assert_eq!(
        asset.cells[1].floor.as_deref(),
        Some("appearance/collision/lobby.flr")
    );
    Ok(())
}

#[test]
fn portal_cell_count_has_to_match() -> Result<(), anyhow::Error> {
    let res = PortalLayoutReader::parse_asset(&mut Cursor::new(build_portal_layout(3)?));
    assert!(matches!(res, Err(ParserError::FormatError { .. })));
    Ok(())
}
