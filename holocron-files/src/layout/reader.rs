use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::iff::{IffChunk, IffForm};
use crate::common::reader::{Parseable, expect_exhausted, read_cstring};
use crate::common::types::Tag;
use crate::layout::types::{InteriorLayoutAsset, InteriorNode, PortalCell, PortalLayoutAsset};

const INLY: Tag = *b"INLY";
const INLY_VERSION: Tag = *b"0000";
const PRTO: Tag = *b"PRTO";
const PRTO_VERSION: Tag = *b"0003";
const CELL_VERSION: Tag = *b"0005";

pub struct InteriorLayoutReader {}

impl InteriorLayoutReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<InteriorLayoutAsset, ParserError> {
        let root = IffForm::read_root(rdr, &INLY)?;
        let version = root.version(&[INLY_VERSION])?;

        let nodes = version
            .chunks_named(b"NODE")
            .map(|chunk| {
                let mut rdr = chunk.reader();
                let node = InteriorNode::parse(&mut rdr)?;
                expect_exhausted(&mut rdr, "Trailing data inside of an interior NODE")?;
                Ok(node)
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        Ok(InteriorLayoutAsset { nodes })
    }
}

pub struct PortalLayoutReader {}

impl PortalLayoutReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<PortalLayoutAsset, ParserError> {
        let root = IffForm::read_root(rdr, &PRTO)?;
        let version = root.version(&[PRTO_VERSION])?;

        let mut header = version.mandatory_chunk(b"DATA")?.reader();
        let portal_count = header.read_u32::<LittleEndian>()?;
        let cell_count = header.read_u32::<LittleEndian>()?;

        let cells = version
            .mandatory_form(b"CELS")?
            .forms_named(b"CELL")
            .map(|cell| parse_cell(cell.version(&[CELL_VERSION])?.mandatory_chunk(b"DATA")?))
            .collect::<Result<Vec<_>, ParserError>>()?;

        if cells.len() != cell_count as usize {
            return Err(ParserError::FormatError {
                reason: "Portal layout cell count does not match the CELL forms",
            });
        }

        Ok(PortalLayoutAsset { portal_count, cells })
    }
}

fn parse_cell(chunk: &IffChunk) -> Result<PortalCell, ParserError> {
    let mut rdr = chunk.reader();
    let portal_count = rdr.read_u32::<LittleEndian>()?;
    let can_see_parent = rdr.read_u8()? != 0;
    let name = read_cstring(&mut rdr)?;
    let appearance = read_cstring(&mut rdr)?;
    let floor = match rdr.read_u8()? {
        0 => None,
        _ => Some(read_cstring(&mut rdr)?),
    };

    Ok(PortalCell {
        name,
        portal_count,
        can_see_parent,
        appearance,
        floor,
    })
}
