use std::io::Read;

use crate::ParserError;
use crate::common::iff::IffForm;
use crate::common::reader::{Parseable, expect_exhausted};
use crate::common::types::Tag;
use crate::component::types::{ComponentAsset, ComponentPart};

const CMPA: Tag = *b"CMPA";
const CMPA_VERSION: Tag = *b"0005";

pub struct ComponentReader {}

impl ComponentReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<ComponentAsset, ParserError> {
        let root = IffForm::read_root(rdr, &CMPA)?;
        let version = root.version(&[CMPA_VERSION])?;

        let parts = version
            .chunks_named(b"PART")
            .map(|chunk| {
                let mut rdr = chunk.reader();
                let part = ComponentPart::parse(&mut rdr)?;
                expect_exhausted(&mut rdr, "Trailing data inside of PART")?;
                Ok(part)
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        Ok(ComponentAsset { parts })
    }
}
